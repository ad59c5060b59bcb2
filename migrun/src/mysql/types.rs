//! Conversions between migrun values and mysql_async values

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::Value as MySqlValue;

pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::Int(v) => MySqlValue::Int(*v),
        Value::UInt(v) => MySqlValue::UInt(*v),
        Value::Float(v) => MySqlValue::Double(*v),
        Value::Text(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
        Value::Date(v) => date_parts(*v, NaiveTime::MIN),
        Value::DateTime(v) => date_parts(v.date(), v.time()),
        Value::Time(v) => MySqlValue::Time(
            false,
            0,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.nanosecond() / 1000,
        ),
    }
}

fn date_parts(date: NaiveDate, time: NaiveTime) -> MySqlValue {
    MySqlValue::Date(
        date.year() as u16,
        date.month() as u8,
        date.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second() as u8,
        time.nanosecond() / 1000,
    )
}

pub fn from_mysql_value(value: MySqlValue) -> Result<Value> {
    match value {
        MySqlValue::NULL => Ok(Value::Null),
        MySqlValue::Bytes(v) => Ok(match String::from_utf8(v) {
            Ok(s) => Value::Text(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        }),
        MySqlValue::Int(v) => Ok(Value::Int(v)),
        MySqlValue::UInt(v) => Ok(Value::UInt(v)),
        MySqlValue::Float(v) => Ok(Value::Float(v.into())),
        MySqlValue::Double(v) => Ok(Value::Float(v)),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => {
            let date = NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
                .ok_or_else(|| Error::TypeConversion {
                    expected: "date",
                    actual: format!("{}-{}-{}", year, month, day),
                })?;
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                return Ok(Value::Date(date));
            }
            let time = NaiveTime::from_hms_micro_opt(hour.into(), min.into(), sec.into(), micro)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "time",
                    actual: format!("{}:{}:{}.{}", hour, min, sec, micro),
                })?;
            Ok(Value::DateTime(NaiveDateTime::new(date, time)))
        }
        MySqlValue::Time(is_neg, days, hours, mins, secs, micro) => {
            // NaiveTime only covers a single day
            if is_neg || days > 0 || hours >= 24 {
                return Err(Error::TypeConversion {
                    expected: "time (00:00:00 to 23:59:59)",
                    actual: format!(
                        "{}{}:{:02}:{:02}",
                        if is_neg { "-" } else { "" },
                        days * 24 + u32::from(hours),
                        mins,
                        secs
                    ),
                });
            }
            let time = NaiveTime::from_hms_micro_opt(hours.into(), mins.into(), secs.into(), micro)
                .ok_or_else(|| Error::TypeConversion {
                    expected: "time",
                    actual: format!("{}:{}:{}.{}", hours, mins, secs, micro),
                })?;
            Ok(Value::Time(time))
        }
    }
}
