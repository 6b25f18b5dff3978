use std::collections::HashMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::disk::{DiskInterface, FileFormat};

/// Seconds added to a trendline's end time when a drag releases on the same
/// time coordinate it started on, so a segment is never vertical in time.
pub const TIME_OFFSET: i64 = 60;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct TrendPoint {
    pub time: i64,
    pub price: f64,
}

impl TrendPoint {
    pub fn new(time: i64, price: f64) -> Self {
        Self { time, price }
    }
}

/// A line segment in (time, price) space. The serialized field names match
/// the persisted format of the stores, so saved collections keep loading
/// across versions.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trendline {
    pub start_time: i64,
    pub start_price: f64,
    pub end_time: i64,
    pub end_price: f64,
}

impl Trendline {
    /// Build a trendline from the two endpoints of a completed drag,
    /// nudging the end time forward by `time_offset` when the drag released
    /// on the start's time coordinate.
    pub fn new(start: TrendPoint, end: TrendPoint, time_offset: i64) -> Self {
        let end_time = if end.time == start.time {
            end.time + time_offset
        } else {
            end.time
        };
        Self {
            start_time: start.time,
            start_price: start.price,
            end_time,
            end_price: end.price,
        }
    }

    /// Composite identity used to associate alert data with a trendline.
    /// Two trendlines with equal coordinates are indistinguishable.
    pub fn id(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.start_time, self.start_price, self.end_time, self.end_price
        )
    }

    pub fn start(&self) -> TrendPoint {
        TrendPoint::new(self.start_time, self.start_price)
    }

    pub fn end(&self) -> TrendPoint {
        TrendPoint::new(self.end_time, self.end_price)
    }

    /// Endpoints in time-ascending order, ready to be rendered or persisted
    /// as a left-to-right polyline.
    pub fn endpoints(&self) -> [TrendPoint; 2] {
        let (a, b) = (self.start(), self.end());
        if a.time <= b.time {
            [a, b]
        } else {
            [b, a]
        }
    }
}

/// The persisted trendline collection. Serializes as a bare JSON array and
/// is rewritten whole on every mutation.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct TrendlineStore {
    trendlines: Vec<Trendline>,
}

impl DiskInterface for TrendlineStore {
    const FILE_NAME: &'static str = "trendlines";
    const FORMAT: FileFormat = FileFormat::JSON;
}

impl TrendlineStore {
    pub fn list(&self) -> &[Trendline] {
        &self.trendlines
    }

    pub fn append(&mut self, trendline: Trendline) -> crate::Result<()> {
        self.trendlines.push(trendline);
        self.save()
    }

    pub fn clear(&mut self) -> crate::Result<()> {
        self.trendlines.clear();
        self.save()
    }

    pub fn is_empty(&self) -> bool {
        self.trendlines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.trendlines.len()
    }
}

/// Alert configuration attached to a trendline. Field names on the wire and
/// on disk match the alert endpoint's expectations.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AlertFormData {
    pub trigger: String,
    pub expiration: String,
    #[serde(rename = "alertName")]
    pub alert_name: String,
    pub message: String,
    #[serde(rename = "multiselect")]
    pub channels: Vec<String>,
}

impl AlertFormData {
    /// Default form contents for a trendline that has no saved alert yet:
    /// fire once, expire in a week at 16:00, message naming the price range.
    pub fn for_trendline(symbol: &str, trendline: &Trendline) -> Self {
        let expiration = (Local::now() + chrono::Duration::days(7))
            .format("%Y-%m-%dT16:00")
            .to_string();
        Self {
            trigger: "Only Once".to_string(),
            expiration,
            alert_name: String::new(),
            message: format!(
                "{symbol} Crossing Trend Line ({:.2} - {:.2})",
                trendline.start_price, trendline.end_price
            ),
            channels: Vec::new(),
        }
    }
}

/// Mapping from a trendline's composite id to its saved alert form data,
/// persisted independently of the trendline collection.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct AlertStore {
    alerts: HashMap<String, AlertFormData>,
}

impl DiskInterface for AlertStore {
    const FILE_NAME: &'static str = "trendline-alerts";
    const FORMAT: FileFormat = FileFormat::JSON;
}

impl AlertStore {
    pub fn get(&self, id: &str) -> Option<&AlertFormData> {
        self.alerts.get(id)
    }

    pub fn set(&mut self, id: String, data: AlertFormData) -> crate::Result<()> {
        self.alerts.insert(id, data);
        self.save()
    }

    pub fn clear(&mut self) -> crate::Result<()> {
        self.alerts.clear();
        self.save()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
