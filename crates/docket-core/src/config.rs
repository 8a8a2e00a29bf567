use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::str::FromStr;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::calendar::WeekStart;
use crate::sort::{
  SortDirection,
  SortKey
};

const DEFAULTS: &[(&str, &str)] = &[
  ("data.location", "~/.docket/paperwork.json"),
  ("default.sort", "date"),
  ("default.direction", "asc"),
  ("calendar.week_start", "sunday"),
  ("calendar.max_visible", "3"),
  ("color", "on")
];

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      map:          DEFAULTS
        .iter()
        .map(|(k, v)| {
          (k.to_string(), v.to_string())
        })
        .collect(),
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(docketrc = %path.display(), "loading docketrc");
      cfg.read_rc(&path, 0)?;
    } else {
      debug!(
        "no docketrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  /// Typed lookup; a present but
  /// unparseable value is an error.
  pub fn get_parsed<T>(
    &self,
    key: &str
  ) -> anyhow::Result<Option<T>>
  where
    T: FromStr,
    T::Err: std::fmt::Display
  {
    self
      .map
      .get(key)
      .map(|raw| {
        raw.trim().parse::<T>().map_err(
          |err| {
            anyhow!(
              "invalid value for {key}: \
               {raw:?} ({err})"
            )
          }
        )
      })
      .transpose()
  }

  pub fn sort_key(
    &self
  ) -> anyhow::Result<SortKey> {
    Ok(
      self
        .get_parsed("default.sort")?
        .unwrap_or_default()
    )
  }

  pub fn sort_direction(
    &self
  ) -> anyhow::Result<SortDirection> {
    Ok(
      self
        .get_parsed("default.direction")?
        .unwrap_or_default()
    )
  }

  pub fn week_start(
    &self
  ) -> anyhow::Result<WeekStart> {
    Ok(
      self
        .get_parsed("calendar.week_start")?
        .unwrap_or_default()
    )
  }

  pub fn max_visible(
    &self
  ) -> anyhow::Result<usize> {
    Ok(
      self
        .get_parsed("calendar.max_visible")?
        .unwrap_or(3)
    )
  }

  /// Reads one rc file; `include` lines
  /// recurse relative to its directory.
  #[tracing::instrument(skip(self))]
  fn read_rc(
    &mut self,
    path: &Path,
    depth: usize
  ) -> anyhow::Result<()> {
    if depth > MAX_INCLUDE_DEPTH {
      return Err(anyhow!(
        "includes nested deeper than \
         {MAX_INCLUDE_DEPTH} at {}",
        path.display()
      ));
    }

    let path = expand_tilde(path);
    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    self.loaded_files.push(path.clone());
    let dir = path
      .parent()
      .unwrap_or_else(|| Path::new("."));

    for (idx, raw) in text.lines().enumerate()
    {
      let line = parse_rc_line(raw)
        .with_context(|| {
          format!(
            "{}:{}",
            path.display(),
            idx + 1
          )
        })?;
      match line {
        | RcLine::Blank => {}
        | RcLine::Include(target) => {
          let target =
            include_target(dir, target);
          if target.exists() {
            self.read_rc(&target, depth + 1)?;
          } else {
            warn!(include = %target.display(), "missing include skipped");
          }
        }
        | RcLine::Setting(key, value) => {
          trace!(key, value, "rc setting");
          self.map.insert(
            key.to_string(),
            value.to_string()
          );
        }
      }
    }

    Ok(())
  }
}

const MAX_INCLUDE_DEPTH: usize = 8;

#[derive(Debug, PartialEq, Eq)]
enum RcLine<'a> {
  Blank,
  Include(&'a str),
  Setting(&'a str, &'a str)
}

/// `key = value`, `include path` or a
/// blank line; `#` starts a comment.
fn parse_rc_line(
  raw: &str
) -> anyhow::Result<RcLine<'_>> {
  let line = raw
    .split_once('#')
    .map_or(raw, |(before, _)| before)
    .trim();

  if line.is_empty() {
    return Ok(RcLine::Blank);
  }
  if let Some(target) =
    line.strip_prefix("include ")
  {
    let target = target.trim();
    if target.is_empty() {
      return Err(anyhow!(
        "include path cannot be empty"
      ));
    }
    return Ok(RcLine::Include(target));
  }

  match line.split_once('=') {
    | Some((key, value))
      if !key.trim().is_empty() =>
    {
      Ok(RcLine::Setting(
        key.trim(),
        value.trim()
      ))
    }
    | _ => Err(anyhow!(
      "expected key = value, got {raw:?}"
    ))
  }
}

fn include_target(
  dir: &Path,
  target: &str
) -> PathBuf {
  let target = expand_tilde(Path::new(target));
  if target.is_absolute() {
    target
  } else {
    dir.join(target)
  }
}

/// The collection file: `--data` wins
/// over `data.location`. Parent
/// directories are created on demand.
#[tracing::instrument(skip(
  cfg,
  override_path
))]
pub fn resolve_data_file(
  cfg: &Config,
  override_path: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let file = if let Some(path) =
    override_path
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    default_data_file()?
  };

  if let Some(dir) = file.parent()
    && !dir.as_os_str().is_empty()
    && !dir.exists()
  {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(file)
}

/// `--docketrc`, then `DOCKETRC`
/// (`/dev/null` turns the rc file off),
/// then `~/.docketrc` when it exists.
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  match std::env::var("DOCKETRC") {
    | Ok(env) if env == "/dev/null" => {
      return Ok(None);
    }
    | Ok(env) => {
      return Ok(Some(PathBuf::from(env)));
    }
    | Err(_) => {}
  }

  Ok(
    dirs::home_dir()
      .map(|home| home.join(".docketrc"))
      .filter(|candidate| candidate.exists())
  )
}

fn default_data_file()
-> anyhow::Result<PathBuf> {
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(home
    .join(".docket")
    .join("paperwork.json"))
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::{
    Config,
    RcLine,
    parse_rc_line
  };
  use crate::calendar::WeekStart;
  use crate::sort::{
    SortDirection,
    SortKey
  };

  #[test]
  fn defaults_are_typed() {
    let cfg = Config::default();
    assert_eq!(
      cfg.sort_key().expect("sort key"),
      SortKey::Date
    );
    assert_eq!(
      cfg.sort_direction().expect("direction"),
      SortDirection::Asc
    );
    assert_eq!(
      cfg.week_start().expect("week start"),
      WeekStart::Sunday
    );
    assert_eq!(
      cfg.max_visible().expect("max visible"),
      3
    );
    assert_eq!(cfg.get_bool("color"), Some(true));
  }

  #[test]
  fn loads_file_with_includes_and_comments() {
    let temp = tempdir().expect("tempdir");
    let extra = temp.path().join("calendar.rc");
    fs::write(
      &extra,
      "calendar.week_start = monday\n"
    )
    .expect("write include");

    let rc = temp.path().join("docketrc");
    fs::write(
      &rc,
      "# docket settings\n\
       default.sort = priority # inline\n\
       \n\
       include calendar.rc\n\
       include missing.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(rc.as_path()))
      .expect("load config");
    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.sort_key().expect("sort key"),
      SortKey::Priority
    );
    assert_eq!(
      cfg.week_start().expect("week start"),
      WeekStart::Monday
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::default();
    cfg.apply_overrides([
      (
        "rc.calendar.max_visible".to_string(),
        "5".to_string()
      ),
      (
        "default.direction".to_string(),
        "desc".to_string()
      )
    ]);
    assert_eq!(
      cfg.max_visible().expect("max visible"),
      5
    );
    assert_eq!(
      cfg.sort_direction().expect("direction"),
      SortDirection::Desc
    );
  }

  #[test]
  fn bad_values_are_reported() {
    let mut cfg = Config::default();
    cfg.apply_overrides([(
      "default.sort".to_string(),
      "size".to_string()
    )]);
    assert!(cfg.sort_key().is_err());
  }

  #[test]
  fn rejects_lines_without_equals() {
    let temp = tempdir().expect("tempdir");
    let rc = temp.path().join("docketrc");
    fs::write(&rc, "color on\n")
      .expect("write rc");
    assert!(Config::load(Some(rc.as_path())).is_err());
  }

  #[test]
  fn parses_rc_lines() {
    assert_eq!(
      parse_rc_line("  # only a comment")
        .expect("comment"),
      RcLine::Blank
    );
    assert_eq!(
      parse_rc_line("color = off # plain")
        .expect("setting"),
      RcLine::Setting("color", "off")
    );
    assert_eq!(
      parse_rc_line("include ~/extra.rc")
        .expect("include"),
      RcLine::Include("~/extra.rc")
    );
    assert!(parse_rc_line("= value").is_err());
    assert!(parse_rc_line("include  ").is_err());
  }

  #[test]
  fn self_include_stops_at_depth_limit() {
    let temp = tempdir().expect("tempdir");
    let rc = temp.path().join("docketrc");
    fs::write(&rc, "include docketrc\n")
      .expect("write rc");
    assert!(Config::load(Some(rc.as_path())).is_err());
  }
}
