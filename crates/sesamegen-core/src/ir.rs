// ── Codegen IR ──
//
// The registration script emitted for the downstream native build: an
// append-only sequence of declaration/registration statements plus
// native library references and build options. Statements render as
// C++-flavoured source via `Display` and serialize via serde for
// machine consumption.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

// ── Expressions ─────────────────────────────────────────────────────

/// Argument expression in a declaration or call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// String literal, rendered quoted and escaped.
    Str(String),
    Int(i64),
    Bool(bool),
    /// Reference to a previously declared variable.
    Ident(String),
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn ident(value: impl Into<String>) -> Self {
        Self::Ident(value.into())
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{}\"", escape(s)),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Ident(id) => f.write_str(id),
        }
    }
}

fn join_args(args: &[Expr]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Entity kinds ────────────────────────────────────────────────────

/// Generic entity subsystems of the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lock,
    Sensor,
    TextSensor,
    BinarySensor,
}

impl EntityKind {
    /// Host-framework registration call for this subsystem.
    pub fn register_fn(self) -> &'static str {
        match self {
            Self::Lock => "register_lock",
            Self::Sensor => "register_sensor",
            Self::TextSensor => "register_text_sensor",
            Self::BinarySensor => "register_binary_sensor",
        }
    }
}

// ── Statements ──────────────────────────────────────────────────────

/// One emitted construction or registration step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Statement {
    /// Construct a native object and bind it to `id`.
    DeclareVar {
        id: String,
        class: String,
        args: Vec<Expr>,
    },
    /// Setter or linker call on a declared variable.
    Adopt {
        target: String,
        method: String,
        args: Vec<Expr>,
    },
    /// Hand a component to the host's polling scheduler.
    RegisterComponent { id: String },
    /// Register an entity with its generic subsystem.
    RegisterEntity { kind: EntityKind, id: String },
    /// Register an event source, restricted to the given types.
    RegisterEvent { id: String, event_types: Vec<String> },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeclareVar { id, class, args } => {
                write!(f, "auto *{id} = new {class}({});", join_args(args))
            }
            Self::Adopt {
                target,
                method,
                args,
            } => write!(f, "{target}->{method}({});", join_args(args)),
            Self::RegisterComponent { id } => write!(f, "App.register_component({id});"),
            Self::RegisterEntity { kind, id } => write!(f, "App.{}({id});", kind.register_fn()),
            Self::RegisterEvent { id, event_types } => {
                let types = event_types
                    .iter()
                    .map(|t| format!("\"{}\"", escape(t)))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{id}->set_event_types({{{types}}});\nApp.register_event({id});")
            }
        }
    }
}

// ── Libraries ───────────────────────────────────────────────────────

/// Native library reference resolved by the downstream build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Library {
    pub name: String,
    /// Pinned tag or version; `None` lets the build resolve the default.
    pub version: Option<String>,
    pub source: String,
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} @ {}#{}", self.name, self.source, version),
            None => write!(f, "{} @ {}", self.name, self.source),
        }
    }
}

// ── Codegen unit ────────────────────────────────────────────────────

/// Everything a single configuration pass emits, in emission order.
/// Writes are append-only; nothing is mutated after emission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CodegenUnit {
    pub statements: Vec<Statement>,
    pub libraries: Vec<Library>,
    pub build_options: IndexMap<String, String>,
}

impl CodegenUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_var(&mut self, id: &str, class: &str, args: Vec<Expr>) {
        self.statements.push(Statement::DeclareVar {
            id: id.to_owned(),
            class: class.to_owned(),
            args,
        });
    }

    pub fn adopt(&mut self, target: &str, method: &str, args: Vec<Expr>) {
        self.statements.push(Statement::Adopt {
            target: target.to_owned(),
            method: method.to_owned(),
            args,
        });
    }

    pub fn register_component(&mut self, id: &str) {
        self.statements
            .push(Statement::RegisterComponent { id: id.to_owned() });
    }

    pub fn register_entity(&mut self, kind: EntityKind, id: &str) {
        self.statements.push(Statement::RegisterEntity {
            kind,
            id: id.to_owned(),
        });
    }

    pub fn register_event(&mut self, id: &str, event_types: Vec<String>) {
        self.statements.push(Statement::RegisterEvent {
            id: id.to_owned(),
            event_types,
        });
    }

    pub fn add_library(&mut self, name: &str, version: Option<&str>, source: &str) {
        self.libraries.push(Library {
            name: name.to_owned(),
            version: version.map(str::to_owned),
            source: source.to_owned(),
        });
    }

    pub fn add_build_option(&mut self, key: &str, value: &str) {
        self.build_options.insert(key.to_owned(), value.to_owned());
    }
}

impl fmt::Display for CodegenUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        if !self.libraries.is_empty() || !self.build_options.is_empty() {
            writeln!(f)?;
        }
        for library in &self.libraries {
            writeln!(f, "// library: {library}")?;
        }
        for (key, value) in &self.build_options {
            writeln!(f, "// build option: {key} = {value}")?;
        }
        Ok(())
    }
}
