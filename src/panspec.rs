use anyhow::Context as _;

use crate::{
    cropspec::CropSpec,
    error::{PancropError, PancropResult},
    track::Anchor,
};

/// One leg of the pan path, anchoring crops to named images.
///
/// `image1`/`crop1` default to `image0`/`crop0`. A null `crop0` continues
/// from the previous spec's end crop (illegal on the first spec).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PanSpec {
    pub image0: String,
    #[serde(default)]
    pub crop0: Option<String>,
    #[serde(default)]
    pub image1: Option<String>,
    #[serde(default)]
    pub crop1: Option<String>,
}

/// Load pan specs from `arg`: tried as a file name first, otherwise parsed
/// as inline JSON. Accepts a single object or an array of them.
pub fn load_pan_specs(arg: &str) -> PancropResult<Vec<PanSpec>> {
    let text = match std::fs::read_to_string(arg) {
        Ok(text) => text,
        Err(_) => arg.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parse pan spec '{arg}'"))
        .map_err(|e| PancropError::configuration(format!("{e:#}")))?;

    let specs = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|spec| vec![spec])
    }
    .with_context(|| format!("decode pan spec '{arg}'"))
    .map_err(|e| PancropError::configuration(format!("{e:#}")))?;

    Ok(specs)
}

/// Resolve pan specs into track anchors. `names` is the full input sequence
/// in order; every image a spec mentions must occur in it. `probe` supplies
/// an image's pixel size and is only called when a crop spec uses relative
/// coordinates.
///
/// Between the anchors produced here the crop path is always the track's
/// linear interpolation; a spec whose `crop0` is null therefore emits an
/// anchor holding the previous end crop at `image0`, which pins the path
/// there until the pan toward `crop1` begins.
pub fn resolve_anchors<F>(
    specs: &[PanSpec],
    names: &[String],
    mut probe: F,
) -> PancropResult<Vec<Anchor>>
where
    F: FnMut(&str) -> PancropResult<(u32, u32)>,
{
    if specs.is_empty() {
        return Err(PancropError::configuration("no pan specs given"));
    }

    let index_of = |name: &str| -> PancropResult<u64> {
        names
            .iter()
            .position(|n| n == name)
            .map(|i| i as u64)
            .ok_or_else(|| {
                PancropError::configuration(format!(
                    "image '{name}' is not in the input sequence"
                ))
            })
    };

    let mut resolve_crop = |s: &str, name: &str| -> PancropResult<crate::geom::Rect> {
        let spec = CropSpec::parse(s)?;
        let size = if spec.needs_size() {
            Some(probe(name)?)
        } else {
            None
        };
        spec.resolve(size)
    };

    // chained specs legitimately restate the previous end anchor
    fn push(anchors: &mut Vec<Anchor>, a: Anchor) {
        if anchors.last() != Some(&a) {
            anchors.push(a);
        }
    }

    let mut anchors: Vec<Anchor> = Vec::new();
    let mut prev_rect = None;
    for spec in specs {
        let i0 = index_of(&spec.image0)?;
        let rect0 = match &spec.crop0 {
            Some(s) => resolve_crop(s, &spec.image0)?,
            None => prev_rect.ok_or_else(|| {
                PancropError::configuration("crop0 may be null only after a previous pan")
            })?,
        };

        let image1 = spec.image1.as_deref().unwrap_or(&spec.image0);
        let i1 = index_of(image1)?;
        let rect1 = match &spec.crop1 {
            Some(s) => resolve_crop(s, image1)?,
            None => rect0,
        };

        if i1 < i0 {
            return Err(PancropError::configuration(format!(
                "image1 '{image1}' precedes image0 '{}' in the sequence",
                spec.image0
            )));
        }
        if i1 == i0 && rect1 != rect0 {
            return Err(PancropError::configuration(format!(
                "conflicting crops anchored to '{}'",
                spec.image0
            )));
        }

        push(&mut anchors, Anchor { frame: i0, rect: rect0 });
        if i1 != i0 {
            push(&mut anchors, Anchor { frame: i1, rect: rect1 });
        }
        prev_rect = Some(rect1);
    }

    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("F{i:03}.jpg")).collect()
    }

    fn no_probe(name: &str) -> PancropResult<(u32, u32)> {
        panic!("probe called for '{name}'");
    }

    #[test]
    fn inline_single_and_array_forms_load() {
        let one = load_pan_specs(r#"{"image0": "a.jpg", "crop0": "0,0,10,10"}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].image0, "a.jpg");

        let two = load_pan_specs(
            r#"[{"image0": "a.jpg", "crop0": "0,0,10,10"},
                {"image0": "b.jpg", "crop0": null, "image1": "c.jpg", "crop1": "5,5,15,15"}]"#,
        )
        .unwrap();
        assert_eq!(two.len(), 2);
        assert!(two[1].crop0.is_none());
    }

    #[test]
    fn file_form_loads() {
        let dir = std::path::PathBuf::from("target").join("panspec_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pans.json");
        std::fs::write(&path, r#"{"image0": "abc", "crop0": "0,1,2,3"}"#).unwrap();

        let specs = load_pan_specs(path.to_str().unwrap()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].image0, "abc");
    }

    #[test]
    fn garbage_is_a_configuration_error() {
        assert!(matches!(
            load_pan_specs("not json at all"),
            Err(PancropError::Configuration(_))
        ));
    }

    #[test]
    fn simple_pan_resolves_to_two_anchors() {
        let names = names(11);
        let specs = vec![PanSpec {
            image0: names[0].clone(),
            crop0: Some("0,0,50,50".into()),
            image1: Some(names[10].clone()),
            crop1: Some("10,10,40,40".into()),
        }];
        let anchors = resolve_anchors(&specs, &names, no_probe).unwrap();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].frame, 0);
        assert_eq!(anchors[0].rect, Rect::new(0.0, 0.0, 50.0, 50.0).unwrap());
        assert_eq!(anchors[1].frame, 10);
        assert_eq!(anchors[1].rect, Rect::new(10.0, 10.0, 30.0, 30.0).unwrap());
    }

    #[test]
    fn null_crop0_chains_from_previous_end() {
        let names = names(20);
        let specs = vec![
            PanSpec {
                image0: names[0].clone(),
                crop0: Some("0,0,50,50".into()),
                image1: None,
                crop1: None,
            },
            PanSpec {
                image0: names[5].clone(),
                crop0: None,
                image1: Some(names[10].clone()),
                crop1: Some("100,100,200,200".into()),
            },
        ];
        let anchors = resolve_anchors(&specs, &names, no_probe).unwrap();
        assert_eq!(anchors.len(), 3);
        // crop holds at the first rect until frame 5, then pans
        assert_eq!(anchors[1].frame, 5);
        assert_eq!(anchors[1].rect, anchors[0].rect);
        assert_eq!(anchors[2].frame, 10);
    }

    #[test]
    fn null_crop0_on_first_spec_is_an_error() {
        let names = names(3);
        let specs = vec![PanSpec {
            image0: names[0].clone(),
            crop0: None,
            image1: None,
            crop1: None,
        }];
        assert!(resolve_anchors(&specs, &names, no_probe).is_err());
    }

    #[test]
    fn unknown_image_is_an_error() {
        let names = names(3);
        let specs = vec![PanSpec {
            image0: "missing.jpg".into(),
            crop0: Some("0,0,10,10".into()),
            image1: None,
            crop1: None,
        }];
        assert!(resolve_anchors(&specs, &names, no_probe).is_err());
    }

    #[test]
    fn backwards_pan_is_an_error() {
        let names = names(5);
        let specs = vec![PanSpec {
            image0: names[3].clone(),
            crop0: Some("0,0,10,10".into()),
            image1: Some(names[1].clone()),
            crop1: Some("5,5,15,15".into()),
        }];
        assert!(resolve_anchors(&specs, &names, no_probe).is_err());
    }

    #[test]
    fn relative_crops_probe_the_anchor_image() {
        let names = names(4);
        let specs = vec![PanSpec {
            image0: names[0].clone(),
            crop0: Some("+10,+10,R0,R0".into()),
            image1: None,
            crop1: None,
        }];
        let mut probed = Vec::new();
        let anchors = resolve_anchors(&specs, &names, |name| {
            probed.push(name.to_string());
            Ok((1200, 1600))
        })
        .unwrap();
        assert_eq!(probed, vec![names[0].clone()]);
        assert_eq!(
            anchors[0].rect,
            Rect::new(10.0, 10.0, 1190.0, 1590.0).unwrap()
        );
    }

    #[test]
    fn restated_chain_anchor_is_deduplicated() {
        let names = names(10);
        let specs = vec![
            PanSpec {
                image0: names[0].clone(),
                crop0: Some("0,0,50,50".into()),
                image1: Some(names[4].clone()),
                crop1: Some("10,10,60,60".into()),
            },
            PanSpec {
                image0: names[4].clone(),
                crop0: None,
                image1: Some(names[9].clone()),
                crop1: Some("0,0,50,50".into()),
            },
        ];
        let anchors = resolve_anchors(&specs, &names, no_probe).unwrap();
        let frames: Vec<u64> = anchors.iter().map(|a| a.frame).collect();
        assert_eq!(frames, vec![0, 4, 9]);
    }
}
