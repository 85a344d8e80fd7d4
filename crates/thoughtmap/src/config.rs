use crate::sizing::FixedWidthSizer;
use crate::{Error, Result};
use narwhal::{RankDir, Ranker};
use serde_json::{Map, Value, json};

/// What to do with an edge whose endpoint is not among the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanglingEdgePolicy {
    #[default]
    Skip,
    Error,
}

/// Layout configuration as a JSON object.
///
/// [`LayoutConfig::default`] holds every key with its default value; user overrides are applied
/// with [`LayoutConfig::deep_merge`] and read back through [`LayoutSettings::from_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig(Value);

impl Default for LayoutConfig {
    fn default() -> Self {
        Self(json!({
            "rankdir": "TB",
            "nodesep": 120,
            "ranksep": 100,
            "edgesep": 20,
            "ranker": "tight-tree",
            "danglingEdges": "skip",
            "node": {
                "width": 360,
                "charsPerLine": 60,
                "baseHeight": 40,
                "lineHeight": 24
            }
        }))
    }
}

impl LayoutConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Defaults overlaid with `overrides`.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(text)?;
        if !overrides.is_object() {
            return Err(Error::InvalidConfig {
                message: "config must be a JSON object".to_string(),
            });
        }
        Ok(Self::with_overrides(&overrides))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path).and_then(Value::as_str)
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path).and_then(Value::as_f64)
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

/// Typed view of a [`LayoutConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    pub rankdir: RankDir,
    pub nodesep: f64,
    pub ranksep: f64,
    pub edgesep: f64,
    pub ranker: Ranker,
    pub dangling_edges: DanglingEdgePolicy,
    pub node: FixedWidthSizer,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 120.0,
            ranksep: 100.0,
            edgesep: 20.0,
            ranker: Ranker::TightTree,
            dangling_edges: DanglingEdgePolicy::Skip,
            node: FixedWidthSizer::default(),
        }
    }
}

impl LayoutSettings {
    /// Reads settings from `cfg`. Keys missing from `cfg` keep their default.
    pub fn from_config(cfg: &LayoutConfig) -> Result<Self> {
        let defaults = Self::default();

        let rankdir = match cfg.get("rankdir") {
            None => defaults.rankdir,
            Some(v) => v
                .as_str()
                .and_then(|s| s.parse::<RankDir>().ok())
                .ok_or_else(|| invalid("rankdir", v, "one of TB, BT, LR, RL"))?,
        };
        let ranker = match cfg.get("ranker") {
            None => defaults.ranker,
            Some(v) => v
                .as_str()
                .and_then(|s| s.parse::<Ranker>().ok())
                .ok_or_else(|| invalid("ranker", v, "\"longest-path\" or \"tight-tree\""))?,
        };
        let dangling_edges = match cfg.get("danglingEdges") {
            None => defaults.dangling_edges,
            Some(v) => match v.as_str().map(str::trim) {
                Some("skip") => DanglingEdgePolicy::Skip,
                Some("error") => DanglingEdgePolicy::Error,
                _ => return Err(invalid("danglingEdges", v, "\"skip\" or \"error\"")),
            },
        };

        let node = FixedWidthSizer {
            width: number(cfg, "node.width", defaults.node.width)?,
            chars_per_line: count(cfg, "node.charsPerLine", defaults.node.chars_per_line)?,
            base_height: number(cfg, "node.baseHeight", defaults.node.base_height)?,
            line_height: number(cfg, "node.lineHeight", defaults.node.line_height)?,
        };
        node.validate()?;

        Ok(Self {
            rankdir,
            nodesep: non_negative(cfg, "nodesep", defaults.nodesep)?,
            ranksep: non_negative(cfg, "ranksep", defaults.ranksep)?,
            edgesep: non_negative(cfg, "edgesep", defaults.edgesep)?,
            ranker,
            dangling_edges,
            node,
        })
    }
}

fn invalid(key: &str, value: &Value, expected: &str) -> Error {
    Error::InvalidConfig {
        message: format!("{key} must be {expected}, got {value}"),
    }
}

fn number(cfg: &LayoutConfig, key: &str, default: f64) -> Result<f64> {
    match cfg.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| invalid(key, v, "a number")),
    }
}

fn non_negative(cfg: &LayoutConfig, key: &str, default: f64) -> Result<f64> {
    let n = number(cfg, key, default)?;
    if n < 0.0 {
        return Err(Error::InvalidConfig {
            message: format!("{key} must not be negative, got {n}"),
        });
    }
    Ok(n)
}

fn count(cfg: &LayoutConfig, key: &str, default: usize) -> Result<usize> {
    match cfg.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| invalid(key, v, "a non-negative integer")),
    }
}
