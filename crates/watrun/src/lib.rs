//! Executes a WAT (or binary wasm) guest module and renders its debug
//! captures to a sequential text sink.
//!
//! The guest imports the `host.debug_*` surface: `debug_begin(ptr, len)`
//! hands over a format pattern living in the exported `memory`,
//! `debug_value_*` calls append typed scalars, and `debug_end` renders one
//! line. Capture semantics live in `watrun-capture`; this crate is the
//! wasmtime wiring around a single execution context.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wasmtime::{Caller, Engine, Extern, Linker, Module, Store, Val};

use watrun_capture::{CaptureError, CaptureStats, FormatSession, TypedValue};

/// Import namespace the debug calls are linked under.
pub const HOST_MODULE: &str = "host";
/// Guest export the pattern bytes are read from.
pub const MEMORY_EXPORT: &str = "memory";
/// Entry export invoked when none is configured.
pub const DEFAULT_ENTRY: &str = "main";

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Exported entry function, invoked with no arguments.
    pub entry: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            entry: DEFAULT_ENTRY.to_string(),
        }
    }
}

/// Outcome of one guest run, serializable as the `--report` JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunReport {
    pub ok: bool,
    pub exit_status: i32,
    /// Set when the trap is an unrecoverable guest defect (placeholder/value
    /// arity mismatch); there is no partial output to recover.
    pub fatal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trap: Option<String>,
    pub capture: CaptureStats,
}

struct HostState {
    session: FormatSession,
    sink: Box<dyn Write + Send>,
}

fn define_debug_imports(linker: &mut Linker<HostState>) -> Result<()> {
    linker.func_wrap(
        HOST_MODULE,
        "debug_begin",
        |mut caller: Caller<'_, HostState>, ptr: u32, len: u32| -> wasmtime::Result<()> {
            let memory = caller
                .get_export(MEMORY_EXPORT)
                .and_then(Extern::into_memory)
                .ok_or_else(|| {
                    anyhow::anyhow!("guest module does not export {MEMORY_EXPORT:?}")
                })?;
            // bounds-check against the live memory before copying anything;
            // ptr and len are guest-controlled
            let start = ptr as usize;
            let pattern = start
                .checked_add(len as usize)
                .and_then(|end| memory.data(&caller).get(start..end))
                .context("debug_begin: pattern read out of bounds")?
                .to_vec();
            caller.data_mut().session.begin(&pattern)?;
            Ok(())
        },
    )?;
    linker.func_wrap(
        HOST_MODULE,
        "debug_value_i32",
        |mut caller: Caller<'_, HostState>, value: i32| -> wasmtime::Result<()> {
            caller.data_mut().session.add_value(TypedValue::I32(value))?;
            Ok(())
        },
    )?;
    linker.func_wrap(
        HOST_MODULE,
        "debug_value_i64",
        |mut caller: Caller<'_, HostState>, value: i64| -> wasmtime::Result<()> {
            caller.data_mut().session.add_value(TypedValue::I64(value))?;
            Ok(())
        },
    )?;
    // the u32/u64 wire arguments are the same i32/i64 slots with the bit
    // pattern reinterpreted unsigned
    linker.func_wrap(
        HOST_MODULE,
        "debug_value_u32",
        |mut caller: Caller<'_, HostState>, value: u32| -> wasmtime::Result<()> {
            caller.data_mut().session.add_value(TypedValue::U32(value))?;
            Ok(())
        },
    )?;
    linker.func_wrap(
        HOST_MODULE,
        "debug_value_u64",
        |mut caller: Caller<'_, HostState>, value: u64| -> wasmtime::Result<()> {
            caller.data_mut().session.add_value(TypedValue::U64(value))?;
            Ok(())
        },
    )?;
    linker.func_wrap(
        HOST_MODULE,
        "debug_value_bool",
        |mut caller: Caller<'_, HostState>, value: i32| -> wasmtime::Result<()> {
            caller
                .data_mut()
                .session
                .add_value(TypedValue::Bool(value != 0))?;
            Ok(())
        },
    )?;
    linker.func_wrap(
        HOST_MODULE,
        "debug_end",
        |mut caller: Caller<'_, HostState>| -> wasmtime::Result<()> {
            let state = caller.data_mut();
            if let Some(line) = state.session.end()? {
                state.sink.write_all(line.as_bytes()).context("write output line")?;
                state.sink.flush().context("flush output sink")?;
            }
            Ok(())
        },
    )?;
    Ok(())
}

fn find_capture_error(err: &anyhow::Error) -> Option<&CaptureError> {
    err.chain().find_map(|cause| cause.downcast_ref::<CaptureError>())
}

/// Executes a module (`.wat` text or `.wasm` binary) against the debug
/// import surface, writing rendered lines to `sink`.
///
/// Load/link failures and a missing entry export return `Err`. Guest traps,
/// including fatal capture errors, come back in-band in the report with
/// `ok = false`; a fatal capture error guarantees no partial line reached
/// the sink.
pub fn run_module(
    module_bytes: &[u8],
    config: &RunnerConfig,
    sink: Box<dyn Write + Send>,
) -> Result<RunReport> {
    let engine = Engine::default();
    let module = Module::new(&engine, module_bytes).context("error loading module")?;

    let mut linker: Linker<HostState> = Linker::new(&engine);
    define_debug_imports(&mut linker)?;

    let state = HostState {
        session: FormatSession::new(),
        sink,
    };
    let mut store = Store::new(&engine, state);
    let instance = linker
        .instantiate(&mut store, &module)
        .context("error instantiating module")?;

    let entry = instance
        .get_func(&mut store, &config.entry)
        .ok_or_else(|| {
            anyhow::anyhow!("entry function {:?} not found in module", config.entry)
        })?;

    let result_count = entry.ty(&store).results().len();
    let mut results = vec![Val::I32(0); result_count];
    let outcome = entry.call(&mut store, &[], &mut results);

    let capture = store.data().session.stats();
    match outcome {
        Ok(()) => Ok(RunReport {
            ok: true,
            exit_status: 0,
            fatal: false,
            trap: None,
            capture,
        }),
        Err(err) => {
            let capture_err = find_capture_error(&err);
            let fatal = capture_err.is_some_and(CaptureError::is_fatal);
            let trap = match capture_err {
                Some(capture_err) => capture_err.to_string(),
                None => format!("{err:#}"),
            };
            Ok(RunReport {
                ok: false,
                exit_status: 1,
                fatal,
                trap: Some(trap),
                capture,
            })
        }
    }
}

/// Reads a module from disk and runs it with stdout as the sink.
pub fn run_wat_file(path: &Path, config: &RunnerConfig) -> Result<RunReport> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read module: {}", path.display()))?;
    run_module(&bytes, config, Box::new(std::io::stdout()))
}
