//! Route pattern compiler.
//!
//! A pattern is a `/`-separated list of segments:
//!
//! - `about` - static, matched literally
//! - `[slug]` - dynamic, captures exactly one path segment
//! - `[...rest]` - catch-all, captures one or more trailing segments
//!
//! The segment kind is decided by syntax alone. A bracketed segment whose
//! inner text is not an identifier (`[a-b]`, `[]`) is a static segment.
//!
//! The same compiled matcher is used on the server and in the client
//! navigator, so both sides always agree on which route a path selects.

use crate::error::{PatternError, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// Captured parameters, in pattern order.
pub type Params = IndexMap<String, String>;

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text
    Static(String),
    /// `[name]`
    Dynamic(String),
    /// `[...name]`
    CatchAll(String),
}

impl Segment {
    /// Classify a single raw segment.
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix("[...").and_then(|s| s.strip_suffix(']')) {
            if is_param_name(name) {
                return Segment::CatchAll(name.to_string());
            }
        }

        if let Some(name) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if is_param_name(name) {
                return Segment::Dynamic(name.to_string());
            }
        }

        Segment::Static(raw.to_string())
    }

    /// Parameter name captured by this segment, if any.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Static(_) => None,
            Segment::Dynamic(name) | Segment::CatchAll(name) => Some(name),
        }
    }

    fn to_regex(&self) -> String {
        match self {
            Segment::Static(text) => regex::escape(text),
            Segment::Dynamic(_) => "([^/]+)".to_string(),
            Segment::CatchAll(_) => "(.+)".to_string(),
        }
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Normalize a request path before matching.
///
/// Drops any query string or fragment, ensures a leading `/` and removes
/// trailing slashes. The root path stays `/`.
pub fn normalize_path(path: &str) -> String {
    let path = match path.find(|c| c == '?' || c == '#') {
        Some(end) => &path[..end],
        None => path,
    };

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// A pattern compiled into a matcher plus its ordered parameter names.
#[derive(Clone)]
pub struct CompiledPattern {
    source: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// - [`PatternError::CatchAllNotTrailing`] when a catch-all is followed
    ///   by more segments
    /// - [`PatternError::DuplicateParam`] when a parameter name repeats
    pub fn compile(pattern: &str) -> Result<Self> {
        let source = normalize_path(pattern);
        let segments: Vec<Segment> = source
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();

        let mut param_names: Vec<String> = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            if let Segment::CatchAll(name) = segment {
                if index + 1 != segments.len() {
                    return Err(PatternError::CatchAllNotTrailing {
                        pattern: source,
                        name: name.clone(),
                    });
                }
            }

            if let Some(name) = segment.param_name() {
                if param_names.iter().any(|existing| existing == name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: source,
                        name: name.to_string(),
                    });
                }
                param_names.push(name.to_string());
            }
        }

        let expression = if segments.is_empty() {
            "^/$".to_string()
        } else {
            let parts: Vec<String> = segments.iter().map(Segment::to_regex).collect();
            format!("^/{}$", parts.join("/"))
        };

        let regex = Regex::new(&expression).map_err(|source_err| PatternError::Regex {
            pattern: source.clone(),
            source: source_err,
        })?;

        Ok(Self {
            source,
            segments,
            param_names,
            regex,
        })
    }

    /// The normalized pattern string.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed segments, root pattern has none.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in capture order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a path, returning captured parameters on success.
    ///
    /// The whole normalized path must be consumed.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let path = normalize_path(path);
        let captures = self.regex.captures(&path)?;

        let mut params = Params::with_capacity(self.param_names.len());
        for (index, name) in self.param_names.iter().enumerate() {
            let value = captures.get(index + 1)?.as_str();
            params.insert(name.clone(), value.to_string());
        }
        Some(params)
    }

    /// Whether the pattern matches a leading portion of `path`.
    ///
    /// Used to find the not-found boundary that covers a path: the root
    /// pattern covers everything, `/blog` covers `/blog/x/y`.
    pub fn matches_prefix(&self, path: &str) -> bool {
        let path = normalize_path(path);
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(text) => {
                    if parts.get(index) != Some(&text.as_str()) {
                        return false;
                    }
                }
                Segment::Dynamic(_) => {
                    if parts.get(index).is_none() {
                        return false;
                    }
                }
                Segment::CatchAll(_) => return parts.len() > index,
            }
        }
        true
    }

    /// Ranking key used to order the route table.
    pub fn specificity(&self) -> Specificity {
        Specificity::of(&self.segments)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("source", &self.source)
            .field("param_names", &self.param_names)
            .finish()
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CompiledPattern {}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Specificity of a pattern. `Less` means more specific.
///
/// Order of comparison:
/// 1. patterns without a catch-all first
/// 2. patterns without a dynamic segment first
/// 3. more segments first
/// 4. more static segments first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specificity {
    pub has_catch_all: bool,
    pub has_dynamic: bool,
    pub total: usize,
    pub static_count: usize,
}

impl Specificity {
    fn of(segments: &[Segment]) -> Self {
        let mut spec = Specificity {
            has_catch_all: false,
            has_dynamic: false,
            total: segments.len(),
            static_count: 0,
        };
        for segment in segments {
            match segment {
                Segment::Static(_) => spec.static_count += 1,
                Segment::Dynamic(_) => spec.has_dynamic = true,
                Segment::CatchAll(_) => spec.has_catch_all = true,
            }
        }
        spec
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.has_catch_all
            .cmp(&other.has_catch_all)
            .then(self.has_dynamic.cmp(&other.has_dynamic))
            .then(other.total.cmp(&self.total))
            .then(other.static_count.cmp(&self.static_count))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
