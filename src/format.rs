use serde::Serialize;

const MILLION: i64 = 1_000_000;

/// Short display form of a head count: whole or one-decimal millions from
/// one million up, whole thousands (rounded down) below that.
pub fn format_count(n: i64) -> String {
    if n >= MILLION {
        if n % MILLION == 0 {
            format!("{} M", n / MILLION)
        } else {
            #[allow(clippy::cast_precision_loss)]
            let millions = n as f64 / MILLION as f64;
            format!("{millions:.1} M")
        }
    } else {
        format!("{} K", n.div_euclid(1000))
    }
}

/// [`format_count`] with a leading `+` on growth.
pub fn format_signed_count(n: i64) -> String {
    if n > 0 {
        format!("+{}", format_count(n))
    } else {
        format_count(n)
    }
}

/// Position of a forecast bound relative to last year's actual total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundTag {
    Below,
    AtOrAbove,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColoredBound {
    pub value: f64,
    pub tag: BoundTag,
}

pub fn colorize_bound(value: f64, reference_prior_total: f64) -> ColoredBound {
    let tag = if value < reference_prior_total {
        BoundTag::Below
    } else {
        BoundTag::AtOrAbove
    };
    ColoredBound { value, tag }
}

/// A bound in millions with two decimals, e.g. `123.45M`.
pub fn format_millions(value: f64) -> String {
    format!("{:.2}M", value / 1_000_000.0)
}

/// `[lower, upper]*`, the asterisk pointing at the 95% interval footnote.
pub fn format_band(lower: &ColoredBound, upper: &ColoredBound) -> String {
    format!("[{}, {}]*", format_millions(lower.value), format_millions(upper.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_millions_have_no_decimal() {
        assert_eq!(format_count(5_000_000), "5 M");
        assert_eq!(format_count(1_000_000), "1 M");
        assert_eq!(format_count(125_000_000), "125 M");
    }

    #[test]
    fn partial_millions_have_one_decimal() {
        assert_eq!(format_count(5_500_000), "5.5 M");
        assert_eq!(format_count(124_352_000), "124.4 M");
        assert_eq!(format_count(5_000_001), "5.0 M");
    }

    #[test]
    fn below_a_million_is_whole_thousands() {
        assert_eq!(format_count(999_000), "999 K");
        assert_eq!(format_count(999_999), "999 K");
        assert_eq!(format_count(512), "0 K");
        assert_eq!(format_count(0), "0 K");
    }

    #[test]
    fn negative_counts_round_down() {
        assert_eq!(format_count(-1_000), "-1 K");
        assert_eq!(format_count(-1_500), "-2 K");
        assert_eq!(format_count(-2_500_000), "-2500 K");
    }

    #[test]
    fn signed_counts() {
        assert_eq!(format_signed_count(1_000_000), "+1 M");
        assert_eq!(format_signed_count(-52_000), "-52 K");
        assert_eq!(format_signed_count(0), "0 K");
    }

    #[test]
    fn bounds_against_reference() {
        assert_eq!(colorize_bound(99.0, 100.0).tag, BoundTag::Below);
        assert_eq!(colorize_bound(100.0, 100.0).tag, BoundTag::AtOrAbove);
        assert_eq!(colorize_bound(101.0, 100.0).tag, BoundTag::AtOrAbove);
    }

    #[test]
    fn band_text() {
        let lower = colorize_bound(123_454_000.0, 124_000_000.0);
        let upper = colorize_bound(124_560_000.0, 124_000_000.0);
        assert_eq!(format_band(&lower, &upper), "[123.45M, 124.56M]*");
    }
}
