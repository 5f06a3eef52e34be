//! Volume comparison between up and down sessions.

use crate::domain::ohlcv::{OhlcvBar, Trend};
use serde::{Serialize, Serializer};

/// How much higher uptrend volume is than downtrend volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeRatio {
    Finite(f64),
    /// Downtrend volume is zero (or absent) while uptrend volume is positive.
    Infinite,
    /// Neither class carries any volume.
    Undefined,
}

impl VolumeRatio {
    pub fn value(&self) -> Option<f64> {
        match self {
            VolumeRatio::Finite(v) => Some(*v),
            VolumeRatio::Infinite => Some(f64::INFINITY),
            VolumeRatio::Undefined => None,
        }
    }
}

/// JSON has no infinity; it is rendered as the string `"Infinity"` and the
/// undefined case as `null`.
impl Serialize for VolumeRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VolumeRatio::Finite(v) => serializer.serialize_f64(*v),
            VolumeRatio::Infinite => serializer.serialize_str("Infinity"),
            VolumeRatio::Undefined => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendVolumeSummary {
    pub avg_volume_uptrend: Option<f64>,
    pub avg_volume_downtrend: Option<f64>,
    pub uptrend_volumes: Vec<i64>,
    pub downtrend_volumes: Vec<i64>,
    pub higher_volume_uptrend: bool,
    pub percentage_higher: VolumeRatio,
}

fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}

pub fn classify_volume_trend(bars: &[OhlcvBar]) -> TrendVolumeSummary {
    let mut uptrend_volumes = Vec::new();
    let mut downtrend_volumes = Vec::new();
    for bar in bars {
        match bar.trend() {
            Trend::Up => uptrend_volumes.push(bar.volume),
            Trend::Down => downtrend_volumes.push(bar.volume),
            Trend::Flat => {}
        }
    }

    let avg_up = mean(&uptrend_volumes);
    let avg_down = mean(&downtrend_volumes);

    let up = avg_up.unwrap_or(0.0);
    let down = avg_down.unwrap_or(0.0);
    let percentage_higher = if down > 0.0 {
        VolumeRatio::Finite((up - down) / down * 100.0)
    } else if up > 0.0 {
        VolumeRatio::Infinite
    } else {
        VolumeRatio::Undefined
    };

    let higher_volume_uptrend = match (avg_up, avg_down) {
        (Some(u), Some(d)) => u > d,
        _ => false,
    };

    TrendVolumeSummary {
        avg_volume_uptrend: avg_up,
        avg_volume_downtrend: avg_down,
        uptrend_volumes,
        downtrend_volumes,
        higher_volume_uptrend,
        percentage_higher,
    }
}
