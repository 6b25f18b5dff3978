use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    disk::Config,
    trendline::{AlertFormData, TrendPoint, Trendline},
};

/// One OHLC bar, decoded from a klines row.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.open <= self.close
    }

    /// Klines rows are heterogeneous arrays: millisecond open time followed
    /// by stringified open/high/low/close prices.
    fn from_kline(row: &[Value]) -> crate::Result<Self> {
        let time = row
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| crate::Error::KlineDecodeFailed(format!("open time in {row:?}")))?
            / 1000;

        let price = |idx: usize| -> crate::Result<f64> {
            row.get(idx)
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| crate::Error::KlineDecodeFailed(format!("field {idx} in {row:?}")))
        };

        Ok(Self {
            time,
            open: price(1)?,
            high: price(2)?,
            low: price(3)?,
            close: price(4)?,
        })
    }
}

/// Fetch the most recent candles for the configured symbol and interval.
pub async fn fetch_candles(config: &Config) -> crate::Result<Vec<Candle>> {
    let url = format!("{}/api/v3/klines", config.candle_api_url);

    let client = reqwest::Client::new();
    let rows: Vec<Vec<Value>> = client
        .get(&url)
        .query(&[
            ("symbol", config.symbol.clone()),
            ("interval", config.interval.clone()),
            ("limit", config.candle_limit.to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    rows.iter().map(|row| Candle::from_kline(row)).collect()
}

#[derive(Serialize, Debug)]
pub struct AlertRequest {
    pub start: TrendPoint,
    pub end: TrendPoint,
    pub alert: AlertFormData,
}

#[derive(Deserialize, Debug)]
pub struct AlertResponse {
    pub message: String,
}

/// Post a trendline's alert configuration to the local backend and return
/// the server's confirmation message.
pub async fn submit_alert(
    config: &Config,
    trendline: &Trendline,
    alert: &AlertFormData,
) -> crate::Result<String> {
    let url = format!("{}/trendline", config.alert_api_url);
    let body = AlertRequest {
        start: trendline.start(),
        end: trendline.end(),
        alert: alert.clone(),
    };

    let client = reqwest::Client::new();
    let response: AlertResponse = client
        .post(&url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response.message)
}
