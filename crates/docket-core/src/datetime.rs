use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

/// Textual date layout shared with the
/// retrieval and submission services.
pub const PAPER_DATE_FORMAT: &str =
  "%d-%m-%Y";

const TIMEZONE_CONFIG_FILE: &str =
  "docket-time.toml";
const TIMEZONE_ENV_VAR: &str =
  "DOCKET_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str =
  "DOCKET_TIME_CONFIG";
const DEFAULT_PROJECT_TIMEZONE: &str =
  "UTC";

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
  timezone: Option<String>,
  time:     Option<TimezoneSection>
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
  timezone: Option<String>
}

pub fn project_timezone() -> &'static Tz
{
  static PROJECT_TZ: OnceLock<Tz> =
    OnceLock::new();
  PROJECT_TZ.get_or_init(
    resolve_project_timezone
  )
}

/// Calendar date of "now" in the
/// project timezone.
#[must_use]
pub fn today() -> NaiveDate {
  Utc::now()
    .with_timezone(project_timezone())
    .date_naive()
}

fn paper_date_regex()
-> Option<&'static Regex> {
  static PAPER_DATE_RE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  PAPER_DATE_RE
    .get_or_init(|| {
      match Regex::new(
        r"^(?P<day>[0-9]{2})-(?P<month>[0-9]{2})-(?P<year>[0-9]{4})$"
      ) {
        | Ok(re) => Some(re),
        | Err(err) => {
          tracing::error!(
            error = %err,
            "internal regex compile failure"
          );
          None
        }
      }
    })
    .as_ref()
}

/// Strict `dd-MM-yyyy` parse.
#[tracing::instrument(level = "trace")]
pub fn parse_date(
  input: &str
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let re = paper_date_regex()
    .ok_or_else(|| {
      anyhow!(
        "date pattern unavailable"
      )
    })?;
  let caps =
    re.captures(token).ok_or_else(
      || {
        anyhow!(
          "expected dd-MM-yyyy, got \
           {token:?}"
        )
      }
    )?;

  let field = |name: &str| {
    caps
      .name(name)
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing {name} in {token:?}"
        )
      })
  };

  let day: u32 = field("day")?
    .parse()
    .context("invalid day")?;
  let month: u32 = field("month")?
    .parse()
    .context("invalid month")?;
  let year: i32 = field("year")?
    .parse()
    .context("invalid year")?;

  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .ok_or_else(|| {
    anyhow!(
      "not a calendar date: {token:?}"
    )
  })
}

/// Lenient parse used inside the
/// engine: malformed text degrades to
/// `today` and is reported through
/// tracing instead of failing the
/// caller.
pub fn parse_date_or_today(
  input: &str,
  today: NaiveDate
) -> NaiveDate {
  match parse_date(input) {
    | Ok(date) => date,
    | Err(err) => {
      tracing::warn!(
        input,
        error = %err,
        fallback = %format_date(today),
        "failed to parse date; using today"
      );
      today
    }
  }
}

#[must_use]
pub fn format_date(
  date: NaiveDate
) -> String {
  date
    .format(PAPER_DATE_FORMAT)
    .to_string()
}

/// Long form used in labels, e.g.
/// `June 5, 2024`.
#[must_use]
pub fn format_long_date(
  date: NaiveDate
) -> String {
  date.format("%B %-d, %Y").to_string()
}

/// Accepts `yyyy-MM` or `MM-yyyy`.
pub fn parse_month(
  input: &str
) -> anyhow::Result<(i32, u32)> {
  let token = input.trim();
  let (left, right) = token
    .split_once('-')
    .ok_or_else(|| {
      anyhow!(
        "expected yyyy-MM or MM-yyyy, \
         got {token:?}"
      )
    })?;

  let (year_raw, month_raw) =
    if left.len() == 4 {
      (left, right)
    } else {
      (right, left)
    };

  let year: i32 =
    year_raw.parse().with_context(
      || format!("invalid year in {token:?}")
    )?;
  let month: u32 =
    month_raw.parse().with_context(
      || {
        format!(
          "invalid month in {token:?}"
        )
      }
    )?;

  if !(1..=12).contains(&month) {
    return Err(anyhow!(
      "month out of range in \
       {token:?}"
    ));
  }

  Ok((year, month))
}

pub fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .unwrap_or(NaiveDate::MIN)
}

pub fn last_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    ),
    -1
  )
}

pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  last_day_of_month(year, month).day()
}

pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

/// Moves `(year, month)` by `months`,
/// carrying into the year.
pub fn shift_months(
  year: i32,
  month: u32,
  months: i32
) -> (i32, u32) {
  let mut year = year;
  let mut month = month as i32 + months;

  while month < 1 {
    month += 12;
    year = year.saturating_sub(1);
  }
  while month > 12 {
    month -= 12;
    year = year.saturating_add(1);
  }

  (year, month as u32)
}

fn resolve_project_timezone() -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  if let Some(path) =
    timezone_config_path()
    && let Some(tz) =
      load_timezone_from_file(&path)
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_PROJECT_TIMEZONE,
    "DEFAULT_PROJECT_TIMEZONE"
  )
  .unwrap_or(chrono_tz::UTC)
}

fn timezone_config_path()
-> Option<PathBuf> {
  if let Ok(raw) = std::env::var(
    TIMEZONE_CONFIG_ENV_VAR
  ) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  std::env::current_dir().ok().map(
    |dir| {
      dir.join(TIMEZONE_CONFIG_FILE)
    }
  )
}

fn load_timezone_from_file(
  path: &PathBuf
) -> Option<Tz> {
  if !path.exists() {
    tracing::debug!(
      file = %path.display(),
      "timezone config file not found"
    );
    return None;
  }

  let raw = match fs::read_to_string(
    path
  ) {
    | Ok(raw) => raw,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed reading timezone config file"
      );
      return None;
    }
  };

  let parsed = match toml::from_str::<
    TimezoneConfig
  >(&raw)
  {
    | Ok(parsed) => parsed,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed parsing timezone config file"
      );
      return None;
    }
  };

  let timezone =
    parsed.timezone.or_else(|| {
      parsed.time.and_then(|section| {
        section.timezone
      })
    });
  let Some(timezone) = timezone else {
    tracing::warn!(
      file = %path.display(),
      "timezone config had no timezone field"
    );
    return None;
  };

  parse_timezone(
    timezone.as_str(),
    &format!("file:{}", path.display())
  )
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "configured project timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Serde adapter writing dates as
/// `dd-MM-yyyy` strings.
pub mod paper_date_serde {
  use chrono::NaiveDate;
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub fn serialize<S>(
    date: &NaiveDate,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &super::format_date(*date)
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<NaiveDate, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    super::parse_date(&raw)
      .map_err(serde::de::Error::custom)
  }

  pub mod option {
    use chrono::NaiveDate;
    use serde::{
      Deserialize,
      Deserializer,
      Serializer
    };

    pub fn serialize<S>(
      date: &Option<NaiveDate>,
      serializer: S
    ) -> Result<S::Ok, S::Error>
    where
      S: Serializer
    {
      match date {
        | Some(value) => {
          super::serialize(
            value, serializer
          )
        }
        | None => {
          serializer.serialize_none()
        }
      }
    }

    pub fn deserialize<'de, D>(
      deserializer: D
    ) -> Result<
      Option<NaiveDate>,
      D::Error
    >
    where
      D: Deserializer<'de>
    {
      let opt =
        Option::<String>::deserialize(
          deserializer
        )?;
      match opt {
        | Some(raw)
          if !raw.trim().is_empty() =>
        {
          crate::datetime::parse_date(
            &raw
          )
          .map(Some)
          .map_err(
            serde::de::Error::custom
          )
        }
        | _ => Ok(None)
      }
    }
  }
}
