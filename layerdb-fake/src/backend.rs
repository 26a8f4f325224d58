use layerdb_core::{NamedValue, Result, Row, Rows, RowsAffected, TxOptions, Value};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock,
    atomic::{AtomicUsize, Ordering},
};

/// The optional capabilities a fake driver exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeCapabilities {
    pub driver_context: bool,
    pub pinger: bool,
    pub prepare_context: bool,
    pub begin_tx: bool,
    pub queryer_context: bool,
    pub queryer: bool,
    pub execer_context: bool,
    pub execer: bool,
    pub named_value_checker: bool,
    pub stmt_query_context: bool,
    pub stmt_exec_context: bool,
}

impl FakeCapabilities {
    /// Every capability.
    pub const fn modern() -> Self {
        Self {
            driver_context: true,
            pinger: true,
            prepare_context: true,
            begin_tx: true,
            queryer_context: true,
            queryer: true,
            execer_context: true,
            execer: true,
            named_value_checker: true,
            stmt_query_context: true,
            stmt_exec_context: true,
        }
    }

    /// Legacy query and execute on the connection, context-aware statements,
    /// nothing else.
    pub const fn legacy() -> Self {
        Self {
            driver_context: false,
            pinger: false,
            prepare_context: false,
            begin_tx: false,
            queryer_context: false,
            queryer: true,
            execer_context: false,
            execer: true,
            named_value_checker: false,
            stmt_query_context: true,
            stmt_exec_context: true,
        }
    }

    /// Only context-aware statements: every connection call has to go through
    /// a prepared statement.
    pub const fn minimal() -> Self {
        Self {
            queryer: false,
            execer: false,
            ..Self::legacy()
        }
    }

    /// No optional capability at all.
    pub const fn none() -> Self {
        Self {
            stmt_query_context: false,
            stmt_exec_context: false,
            ..Self::minimal()
        }
    }
}

impl Default for FakeCapabilities {
    fn default() -> Self {
        Self::modern()
    }
}

/// Which backend entry point served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Via {
    /// Connection, context-aware.
    Context,
    /// Connection, legacy positional.
    Legacy,
    /// Prepared statement, context-aware.
    Statement,
    /// Prepared statement, legacy positional.
    StatementLegacy,
}

/// A call received by the fake backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(String),
    Connect(String),
    Ping,
    Prepare(String),
    Query {
        query: String,
        args: Vec<NamedValue>,
        via: Via,
    },
    Exec {
        query: String,
        args: Vec<NamedValue>,
        via: Via,
    },
    Begin(TxOptions),
}

pub type PingHook = Arc<dyn Fn() -> Result<()> + Send + Sync>;
pub type QueryHook = Arc<dyn Fn(&str, &[NamedValue]) -> Result<Rows> + Send + Sync>;
pub type ExecHook = Arc<dyn Fn(&str, &[NamedValue]) -> Result<RowsAffected> + Send + Sync>;
pub type BeginHook = Arc<dyn Fn(TxOptions) -> Result<()> + Send + Sync>;

#[derive(Default, Clone)]
pub(crate) struct Hooks {
    pub(crate) ping: Option<PingHook>,
    pub(crate) query: Option<QueryHook>,
    pub(crate) exec: Option<ExecHook>,
    pub(crate) begin: Option<BeginHook>,
}

#[derive(Default, Debug)]
pub(crate) struct Counters {
    pub(crate) connections: AtomicUsize,
    pub(crate) closed_connections: AtomicUsize,
    pub(crate) prepared: AtomicUsize,
    pub(crate) closed_statements: AtomicUsize,
    pub(crate) commits: AtomicUsize,
    pub(crate) rollbacks: AtomicUsize,
}

pub(crate) fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

pub(crate) fn get(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

pub(crate) struct Backend {
    pub(crate) capabilities: FakeCapabilities,
    pub(crate) hooks: RwLock<Hooks>,
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) counters: Counters,
}

impl Backend {
    pub(crate) fn new(capabilities: FakeCapabilities) -> Self {
        Self {
            capabilities,
            hooks: Default::default(),
            calls: Default::default(),
            counters: Default::default(),
        }
    }

    pub(crate) fn hooks(&self) -> Hooks {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_hooks(&self, f: impl FnOnce(&mut Hooks)) {
        f(&mut self.hooks.write().unwrap_or_else(PoisonError::into_inner));
    }

    pub(crate) fn calls(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn record(&self, call: Call) {
        log::trace!("Fake backend received {:?}", call);
        self.calls().push(call);
    }

    pub(crate) fn ping(&self) -> Result<()> {
        self.record(Call::Ping);
        match self.hooks().ping {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }

    pub(crate) fn query(&self, query: &str, args: Vec<NamedValue>, via: Via) -> Result<Rows> {
        let hook = self.hooks().query;
        let result = match &hook {
            Some(hook) => hook(query, &args),
            None => Ok(echo(&args)),
        };
        self.record(Call::Query {
            query: query.into(),
            args,
            via,
        });
        result
    }

    pub(crate) fn exec(&self, query: &str, args: Vec<NamedValue>, via: Via) -> Result<RowsAffected> {
        let hook = self.hooks().exec;
        let result = match &hook {
            Some(hook) => hook(query, &args),
            None => Ok(RowsAffected::new(1)),
        };
        self.record(Call::Exec {
            query: query.into(),
            args,
            via,
        });
        result
    }

    pub(crate) fn begin(&self, options: TxOptions) -> Result<()> {
        self.record(Call::Begin(options));
        match self.hooks().begin {
            Some(hook) => hook(options),
            None => Ok(()),
        }
    }
}

/// Positional arguments, as the legacy entry points receive them.
pub(crate) fn from_values(values: &[Value]) -> Vec<NamedValue> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| NamedValue::new(i + 1, v.clone()))
        .collect()
}

/// One row holding the argument values, columns named after the arguments.
pub fn echo(args: &[NamedValue]) -> Rows {
    let labels = args
        .iter()
        .map(|a| {
            if a.is_named() {
                a.name.clone()
            } else {
                format!("${}", a.ordinal)
            }
        })
        .collect::<Vec<_>>();
    let row: Row = args.iter().map(|a| a.value.clone()).collect();
    rows(labels, [row])
}

/// Rows from in-memory values.
pub fn rows<L, R>(labels: L, rows: R) -> Rows
where
    L: IntoIterator,
    L::Item: Into<String>,
    R: IntoIterator<Item = Row>,
    R::IntoIter: Send + 'static,
{
    Rows::from_rows(
        labels.into_iter().map(Into::into).collect::<Vec<String>>(),
        rows,
    )
}
