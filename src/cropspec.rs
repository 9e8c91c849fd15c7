use crate::{
    error::{PancropError, PancropResult},
    geom::Rect,
};

// Crop corner strings: "x1,y1,x2,y2", each coordinate one of
//  * bare digits         - absolute pixel coordinate
//  * +n / R+n            - n pixels in from the low edge
//  * -n / R-n            - n pixels back from the high edge
//  * R0 (or +0)          - the low edge for x1/y1, the high edge for x2/y2
//  * Sn                  - size: x1+n / y1+n (not allowed on x1/y1)
// Missing trailing fields default to the edge form, so "" is the full image.
// Relative forms are resolved ONCE, against the anchor image's size.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Coord {
    Absolute(i64),
    FromLow(i64),
    FromHigh(i64), // stored negative, added to the image size
    Edge,
    Size(i64),
}

impl Coord {
    fn parse(s: &str) -> PancropResult<Self> {
        let s = s.trim();
        let bad = || PancropError::configuration(format!("bad crop coordinate '{s}'"));
        let int = |digits: &str| digits.parse::<i64>().map_err(|_| bad());

        let mut rest = s;
        let relative = if let Some(r) = s.strip_prefix(['R', 'r']) {
            rest = r;
            true
        } else {
            s.starts_with(['+', '-'])
        };

        if relative {
            let v = int(rest)?;
            return Ok(match v {
                0 => Self::Edge,
                v if v > 0 => Self::FromLow(v),
                v => Self::FromHigh(v),
            });
        }
        if let Some(digits) = rest.strip_prefix(['S', 's']) {
            return Ok(Self::Size(int(digits)?));
        }
        Ok(Self::Absolute(int(rest)?))
    }
}

/// A parsed, not-yet-resolved crop corner specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropSpec {
    coords: [Coord; 4], // x1, y1, x2, y2
}

impl CropSpec {
    pub fn parse(s: &str) -> PancropResult<Self> {
        let fields: Vec<&str> = if s.trim().is_empty() {
            vec![]
        } else {
            s.split(',').collect()
        };
        if fields.len() > 4 {
            return Err(PancropError::configuration(format!(
                "too many fields in crop spec '{s}'"
            )));
        }

        let mut coords = [Coord::Edge; 4];
        for (i, f) in fields.iter().enumerate() {
            coords[i] = Coord::parse(f)?;
        }
        Ok(Self { coords })
    }

    /// True when resolution needs the anchor image's dimensions.
    pub fn needs_size(&self) -> bool {
        self.coords.iter().enumerate().any(|(i, c)| match c {
            Coord::FromHigh(_) => true,
            Coord::Edge => i >= 2, // high edge on x2/y2
            _ => false,
        })
    }

    /// Resolve against an image size into x,y,w,h form.
    pub fn resolve(&self, size: Option<(u32, u32)>) -> PancropResult<Rect> {
        fn need(max: Option<i64>) -> PancropResult<i64> {
            max.ok_or_else(|| {
                PancropError::configuration(
                    "relative crop coordinates require the anchor image's size",
                )
            })
        }

        fn first(c: Coord, max: Option<i64>) -> PancropResult<i64> {
            match c {
                Coord::Absolute(v) | Coord::FromLow(v) => Ok(v),
                Coord::Edge => Ok(0),
                Coord::FromHigh(v) => Ok(need(max)? + v),
                Coord::Size(_) => Err(PancropError::configuration(
                    "size form (S) is not allowed on x1/y1",
                )),
            }
        }

        fn second(c: Coord, low: i64, max: Option<i64>) -> PancropResult<i64> {
            match c {
                Coord::Absolute(v) | Coord::FromLow(v) => Ok(v),
                Coord::Edge => need(max),
                Coord::FromHigh(v) => Ok(need(max)? + v),
                Coord::Size(v) => Ok(low + v),
            }
        }

        let max_x = size.map(|(w, _)| i64::from(w));
        let max_y = size.map(|(_, h)| i64::from(h));
        let x1 = first(self.coords[0], max_x)?;
        let y1 = first(self.coords[1], max_y)?;
        let x2 = second(self.coords[2], x1, max_x)?;
        let y2 = second(self.coords[3], y1, max_y)?;
        Rect::from_corners(x1 as f64, y1 as f64, x2 as f64, y2 as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: (u32, u32) = (1200, 1600);

    fn resolved(s: &str) -> (f64, f64, f64, f64) {
        let r = CropSpec::parse(s).unwrap().resolve(Some(SIZE)).unwrap();
        (r.x, r.y, r.x + r.width, r.y + r.height)
    }

    #[test]
    fn coordinate_forms_resolve_as_corners() {
        assert_eq!(resolved("0,0,1,1"), (0.0, 0.0, 1.0, 1.0));
        assert_eq!(resolved("+10, +11, R0, R0"), (10.0, 11.0, 1200.0, 1600.0));
        assert_eq!(resolved("10, 20, R-100, S50"), (10.0, 20.0, 1100.0, 70.0));
        assert_eq!(resolved("10, 10,S100,S200"), (10.0, 10.0, 110.0, 210.0));
        // defaulting: empty spec is the full image
        assert_eq!(resolved(""), (0.0, 0.0, 1200.0, 1600.0));
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(CropSpec::parse("0,RR,7,8").is_err());
        assert!(CropSpec::parse("1,2,3,4,5").is_err());
        assert!(CropSpec::parse("1,2,S+,4").is_err());
    }

    #[test]
    fn size_form_is_rejected_on_first_coords() {
        let spec = CropSpec::parse("S10,0,100,100").unwrap();
        assert!(spec.resolve(Some(SIZE)).is_err());
    }

    #[test]
    fn needs_size_tracks_relative_forms() {
        assert!(!CropSpec::parse("0,0,100,100").unwrap().needs_size());
        assert!(!CropSpec::parse("10,10,S100,S200").unwrap().needs_size());
        assert!(CropSpec::parse("+10,+10,R0,R0").unwrap().needs_size());
        assert!(CropSpec::parse("R-10,0,100,100").unwrap().needs_size());
    }

    #[test]
    fn absolute_specs_resolve_without_a_size() {
        let r = CropSpec::parse("0,10,200,210")
            .unwrap()
            .resolve(None)
            .unwrap();
        assert_eq!(r, Rect::new(0.0, 10.0, 200.0, 200.0).unwrap());

        assert!(CropSpec::parse("+10,+10,R0,R0")
            .unwrap()
            .resolve(None)
            .is_err());
    }

    #[test]
    fn inverted_corners_are_rejected() {
        assert!(CropSpec::parse("100,0,50,100")
            .unwrap()
            .resolve(Some(SIZE))
            .is_err());
    }
}
