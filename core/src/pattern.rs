//! `RoutePattern`: Compiled route templates
//!
//! A template is literal text interleaved with variables:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `<name>` | Named variable, default class |
//! | `<name:class>` | Named variable, built-in type class |
//! | `<name:regex>` | Named variable, embedded regex |
//! | `<:class>` / `<:regex>` / `<>` | Unnamed (positional) variable |
//!
//! Literal text matches verbatim. Inside an embedded regex, write `>` as `\>`.
//!
//! Compilation produces one anchored regex (the matcher) and keeps the parsed
//! segments (the builder). Both directions share the per-variable validators,
//! so a value accepted by [`RoutePattern::expand`] is always matched back.

use crate::{BuildError, PatternError, MAX_TEMPLATE_LENGTH};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// What a template is matched against.
///
/// The kind decides the default class of unconstrained variables and whether
/// built values are percent-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Request path. Default class: [`TypeClass::String`].
    Path,
    /// Request host (without port). Default class: [`TypeClass::Label`].
    Host,
}

impl PatternKind {
    fn default_class(self) -> TypeClass {
        match self {
            Self::Path => TypeClass::String,
            Self::Host => TypeClass::Label,
        }
    }
}

/// Value class of a template variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClass {
    /// One or more non-slash characters.
    String,
    /// One or more word characters (`\w+`).
    Word,
    /// One or more digits (`int`).
    Int,
    /// One or more digits (`number`).
    Number,
    /// One or more letters (`\p{L}+`).
    Unicode,
    /// One or more non-dot characters: a single host label.
    Label,
    /// An embedded regex (Rust `regex` syntax).
    Regex(String),
}

impl TypeClass {
    /// Resolve a built-in class by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "word" => Some(Self::Word),
            "int" => Some(Self::Int),
            "number" => Some(Self::Number),
            "unicode" => Some(Self::Unicode),
            "label" => Some(Self::Label),
            _ => None,
        }
    }

    /// The regex source this class matches.
    #[must_use]
    pub fn regex_source(&self) -> &str {
        match self {
            Self::String => "[^/]+",
            Self::Word => r"\w+",
            Self::Int | Self::Number => r"\d+",
            Self::Unicode => r"\p{L}+",
            Self::Label => r"[^.]+",
            Self::Regex(source) => source,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Word => f.write_str("word"),
            Self::Int => f.write_str("int"),
            Self::Number => f.write_str("number"),
            Self::Unicode => f.write_str("unicode"),
            Self::Label => f.write_str("label"),
            Self::Regex(source) => write!(f, "regex({source})"),
        }
    }
}

/// A template variable.
#[derive(Debug, Clone)]
pub struct Variable {
    name: Option<String>,
    class: TypeClass,
    group: String,
    validator: Regex,
}

impl Variable {
    /// The variable name, `None` for positional placeholders.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The variable's type class.
    #[must_use]
    pub fn class(&self) -> &TypeClass {
        &self.class
    }

    /// Returns `true` if `value` conforms to the variable's class in full.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.validator.is_match(value)
    }
}

/// One parsed piece of a template.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Text matched and emitted verbatim.
    Literal(String),
    /// A variable placeholder.
    Variable(Variable),
}

/// Values extracted by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    /// Unnamed captures, left to right.
    pub positional: Vec<String>,
    /// Named captures.
    pub named: BTreeMap<String, String>,
}

/// A compiled route template.
///
/// Immutable after compilation. Shared (via `Arc`) between the rules that
/// use the same template.
///
/// # Example
///
/// ```
/// use ruta::{PatternKind, RoutePattern};
///
/// let pattern = RoutePattern::compile(PatternKind::Path, "/user/<username:word>/<:int>").unwrap();
/// let caps = pattern.captures("/user/calvin/42").unwrap();
/// assert_eq!(caps.named["username"], "calvin");
/// assert_eq!(caps.positional, vec!["42".to_string()]);
/// assert!(pattern.captures("/user/calvin/abc").is_none());
/// ```
#[derive(Clone)]
pub struct RoutePattern {
    template: String,
    kind: PatternKind,
    segments: Vec<Segment>,
    regex: Regex,
    prefix_regex: Regex,
}

impl RoutePattern {
    /// Compile a template.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the template is malformed: unterminated
    /// variable, invalid name, unknown class, invalid regex, repeated name,
    /// or over [`MAX_TEMPLATE_LENGTH`].
    pub fn compile(kind: PatternKind, template: &str) -> Result<Self, PatternError> {
        if template.len() > MAX_TEMPLATE_LENGTH {
            return Err(PatternError::TemplateTooLong {
                len: template.len(),
                max: MAX_TEMPLATE_LENGTH,
            });
        }

        let segments = parse(kind, template)?;

        let mut body = String::with_capacity(template.len() * 2);
        for segment in &segments {
            match segment {
                Segment::Literal(text) => body.push_str(&regex::escape(text)),
                Segment::Variable(var) => {
                    body.push_str("(?P<");
                    body.push_str(&var.group);
                    body.push('>');
                    body.push_str(var.class.regex_source());
                    body.push(')');
                }
            }
        }

        let regex = compile_regex(template, &format!("^{body}$"))?;
        let prefix_regex = compile_regex(template, &format!("^{body}"))?;

        Ok(Self {
            template: template.to_owned(),
            kind,
            segments,
            regex,
            prefix_regex,
        })
    }

    /// The source template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// What this pattern matches against.
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Parsed segments in template order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Variables in template order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(v) => Some(v),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if the template declares a named variable `name`.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v.name() == Some(name))
    }

    /// Returns `true` if the candidate conforms to the whole pattern.
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Returns `true` if the candidate starts with text matching the pattern.
    #[must_use]
    pub fn is_prefix_of(&self, candidate: &str) -> bool {
        self.prefix_regex.is_match(candidate)
    }

    /// Match the candidate in full and split captures into positional and named.
    #[must_use]
    pub fn captures(&self, candidate: &str) -> Option<Captures> {
        let caps = self.regex.captures(candidate)?;
        let mut out = Captures::default();
        for var in self.variables() {
            let value = caps.name(&var.group).map_or("", |m| m.as_str()).to_owned();
            match &var.name {
                Some(name) => {
                    out.named.insert(name.clone(), value);
                }
                None => out.positional.push(value),
            }
        }
        Some(out)
    }

    /// Match the candidate in full and return every capture in template order.
    ///
    /// Host routes expose their captures this way, named or not.
    #[must_use]
    pub fn ordered_captures(&self, candidate: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(candidate)?;
        Some(
            self.variables()
                .map(|var| caps.name(&var.group).map_or("", |m| m.as_str()).to_owned())
                .collect(),
        )
    }

    /// Substitute values back into the template.
    ///
    /// Named variables take `kwargs[name]`, falling back to `defaults[name]`.
    /// Unnamed placeholders consume `args` in order. Path values are
    /// percent-encoded with `/` preserved.
    ///
    /// # Errors
    ///
    /// - [`BuildError::MissingValue`] / [`BuildError::MissingPositional`] when a value is absent
    /// - [`BuildError::InvalidValue`] when a value does not conform to its class
    pub fn expand(
        &self,
        args: &[String],
        kwargs: &BTreeMap<String, String>,
        defaults: &BTreeMap<String, String>,
    ) -> Result<String, BuildError> {
        let mut positional = args.iter();
        let mut index = 0;
        let mut out = String::with_capacity(self.template.len());

        for segment in &self.segments {
            let var = match segment {
                Segment::Literal(text) => {
                    match self.kind {
                        PatternKind::Path => push_encoded(&mut out, text),
                        PatternKind::Host => out.push_str(text),
                    }
                    continue;
                }
                Segment::Variable(var) => var,
            };

            let (label, value) = match &var.name {
                Some(name) => {
                    let value = kwargs.get(name).or_else(|| defaults.get(name)).ok_or_else(|| {
                        BuildError::MissingValue {
                            name: name.clone(),
                            template: self.template.clone(),
                        }
                    })?;
                    (name.clone(), value)
                }
                None => {
                    let value = positional.next().ok_or_else(|| BuildError::MissingPositional {
                        index,
                        template: self.template.clone(),
                    })?;
                    index += 1;
                    (format!("#{}", index - 1), value)
                }
            };

            if !var.accepts(value) {
                return Err(BuildError::InvalidValue {
                    name: label,
                    value: value.clone(),
                    template: self.template.clone(),
                });
            }

            match self.kind {
                PatternKind::Path => push_encoded(&mut out, value),
                PatternKind::Host => out.push_str(value),
            }
        }

        Ok(out)
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("template", &self.template)
            .field("kind", &self.kind)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Compiler cache
// ═══════════════════════════════════════════════════════════════════════════════

/// Compiles templates once and hands out shared patterns.
///
/// Owned by the [`Router`](crate::Router) and used only during registration,
/// so the cache needs no locking.
#[derive(Default)]
pub struct PatternCompiler {
    cache: HashMap<(PatternKind, String), Arc<RoutePattern>>,
}

impl PatternCompiler {
    /// Create an empty compiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template`, reusing a cached pattern when one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the template is malformed. Failures are
    /// not cached.
    pub fn compile(
        &mut self,
        kind: PatternKind,
        template: &str,
    ) -> Result<Arc<RoutePattern>, PatternError> {
        let key = (kind, template.to_owned());
        if let Some(pattern) = self.cache.get(&key) {
            return Ok(Arc::clone(pattern));
        }
        let pattern = Arc::new(RoutePattern::compile(kind, template)?);
        self.cache.insert(key, Arc::clone(&pattern));
        Ok(pattern)
    }

    /// Number of cached patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if nothing has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl fmt::Debug for PatternCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternCompiler")
            .field("cached", &self.cache.len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse(kind: PatternKind, template: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices();

    while let Some((start, c)) = chars.next() {
        if c != '<' {
            literal.push(c);
            continue;
        }

        let mut body = String::new();
        let mut closed = false;
        while let Some((_, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, '>')) => body.push('>'),
                    Some((_, escaped)) => {
                        body.push('\\');
                        body.push(escaped);
                    }
                    None => break,
                },
                '>' => {
                    closed = true;
                    break;
                }
                _ => body.push(c),
            }
        }

        if !closed {
            return Err(PatternError::UnterminatedVariable {
                template: template.to_owned(),
                position: start,
            });
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        let group = format!("g{}", segments.len());
        let var = parse_variable(kind, template, &body, group)?;

        if let Some(name) = &var.name {
            let repeated = segments.iter().any(|s| {
                matches!(s, Segment::Variable(other) if other.name.as_ref() == Some(name))
            });
            if repeated {
                return Err(PatternError::DuplicateVariable {
                    template: template.to_owned(),
                    name: name.clone(),
                });
            }
        }
        segments.push(Segment::Variable(var));
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_variable(
    kind: PatternKind,
    template: &str,
    body: &str,
    group: String,
) -> Result<Variable, PatternError> {
    let (name, constraint) = match body.split_once(':') {
        Some((name, constraint)) => (name, Some(constraint)),
        None => (body, None),
    };

    let name = if name.is_empty() {
        None
    } else if is_identifier(name) {
        Some(name.to_owned())
    } else {
        return Err(PatternError::InvalidVariableName {
            template: template.to_owned(),
            name: name.to_owned(),
        });
    };

    let class = match constraint {
        None | Some("") => kind.default_class(),
        Some(c) => match TypeClass::from_name(c) {
            Some(class) => class,
            // A bare lowercase word is always a class name; literal regexes go in (?:...)
            None if c.bytes().all(|b| b.is_ascii_lowercase() || b == b'_') => {
                return Err(PatternError::UnknownTypeClass {
                    template: template.to_owned(),
                    class: c.to_owned(),
                });
            }
            None => {
                compile_regex(template, c)?;
                TypeClass::Regex(c.to_owned())
            }
        },
    };

    let validator = compile_regex(template, &format!("^(?:{})$", class.regex_source()))?;

    Ok(Variable {
        name,
        class,
        group,
        validator,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn compile_regex(template: &str, source: &str) -> Result<Regex, PatternError> {
    Regex::new(source).map_err(|e| PatternError::InvalidRegex {
        template: template.to_owned(),
        regex: source.to_owned(),
        source: e.to_string(),
    })
}

fn push_encoded(out: &mut String, value: &str) {
    for (i, piece) in value.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(&urlencoding::encode(piece));
    }
}
