use std::ops::{Range, RangeInclusive};

use anyhow::{bail, Context};

/// A chapter range as typed on the command line: `5`, `1..10`, `1..=10`, `3..`.
#[derive(PartialEq, Clone, Default)]
pub struct IntRange {
    start: Option<u32>,
    end: Option<u32>,
    end_inclusive: bool,
}

impl IntRange {
    #[cfg(test)]
    fn new(start: Option<u32>, end: Option<u32>, end_inclusive: bool) -> Self {
        Self {
            start,
            end,
            end_inclusive,
        }
    }

    /// The chapters this range walks over. Both ends have to be known, we
    /// can't ask the site how many chapters exist.
    pub fn chapters(&self) -> anyhow::Result<RangeInclusive<u32>> {
        let start = self.start.context("Chapter range needs a start")?;
        let end = match (self.end, self.end_inclusive) {
            (Some(end), true) => end,
            (Some(0), false) => return Ok(RangeInclusive::new(1, 0)),
            (Some(end), false) => end - 1,
            (None, _) => bail!("Chapter range needs an end"),
        };
        Ok(start..=end)
    }
}

impl std::fmt::Debug for IntRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}{}",
            self.start.map(|start| start.to_string()).unwrap_or_default(),
            if self.end_inclusive { "=" } else { "" },
            self.end.map(|end| end.to_string()).unwrap_or_default(),
        )
    }
}

impl std::str::FromStr for IntRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split("..");
        let start = match parts.next() {
            Some("") => None,
            Some(start_str) => Some(start_str.parse::<u32>().context("Invalid start value")?),
            None => bail!("Invalid range syntax"),
        };

        let (end_str, end_inclusive) = match parts.next() {
            Some(end_str) => match end_str.strip_prefix('=') {
                Some(rest) => (rest, true),
                None => (end_str, false),
            },
            // A single chapter
            None => {
                return Ok(Self {
                    start,
                    end: start,
                    end_inclusive: true,
                })
            }
        };

        if parts.next().is_some() {
            bail!("Invalid range syntax");
        }

        let end = match end_str {
            "" => None,
            _ => Some(end_str.parse::<u32>().context("Invalid end value")?),
        };

        Ok(IntRange {
            start,
            end,
            end_inclusive,
        })
    }
}

impl From<RangeInclusive<u32>> for IntRange {
    fn from(value: RangeInclusive<u32>) -> Self {
        Self {
            start: Some(value.start().to_owned()),
            end: Some(value.end().to_owned()),
            end_inclusive: true,
        }
    }
}

impl From<Range<u32>> for IntRange {
    fn from(value: Range<u32>) -> Self {
        Self {
            start: Some(value.start),
            end: Some(value.end),
            end_inclusive: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_valid_range() -> anyhow::Result<()> {
        assert_eq!(IntRange::from_str("5..10")?, IntRange::from(5..10));
        assert_eq!(IntRange::from_str("0..=100")?, IntRange::from(0..=100));
        assert_eq!(
            IntRange::from_str("..=10")?,
            IntRange::new(None, Some(10), true)
        );
        Ok(())
    }

    #[test]
    fn parse_valid_unit() -> anyhow::Result<()> {
        let range = IntRange::from_str("10")?;
        assert_eq!(range, IntRange::from(10..=10));
        assert_eq!(range.chapters()?.collect::<Vec<_>>(), vec![10]);
        Ok(())
    }

    #[test]
    fn parse_open_ends() -> anyhow::Result<()> {
        assert_eq!(
            IntRange::from_str("5..")?,
            IntRange::new(Some(5), None, false)
        );
        assert_eq!(IntRange::from_str("..")?, IntRange::new(None, None, false));
        Ok(())
    }

    #[test]
    fn chapters_walks_inclusive_and_exclusive() -> anyhow::Result<()> {
        assert_eq!(
            IntRange::from(3..=5).chapters()?.collect::<Vec<_>>(),
            vec![3, 4, 5]
        );
        assert_eq!(
            IntRange::from(3..5).chapters()?.collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert_eq!(IntRange::from(0..0).chapters()?.count(), 0);
        assert_eq!(IntRange::from(7..=2).chapters()?.count(), 0);
        Ok(())
    }

    #[test]
    fn chapters_needs_both_ends() {
        assert!(IntRange::from_str("3..").unwrap().chapters().is_err());
        assert!(IntRange::from_str("..3").unwrap().chapters().is_err());
    }

    #[test]
    fn invalid_values() {
        assert_eq!(
            IntRange::from_str("a..10").err().unwrap().to_string(),
            "Invalid start value"
        );
        assert_eq!(
            IntRange::from_str("10..-10").err().unwrap().to_string(),
            "Invalid end value"
        );
        assert_eq!(
            IntRange::from_str("1..2..3").err().unwrap().to_string(),
            "Invalid range syntax"
        );
    }

    #[test]
    fn debug_shows_range_syntax() {
        assert_eq!(format!("{:?}", IntRange::from(1..=4)), "1..=4");
        assert_eq!(format!("{:?}", IntRange::new(Some(2), None, false)), "2..");
    }
}
