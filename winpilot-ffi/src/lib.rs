//! C ABI DLL for winpilot -- loadable by ctypes, C#, or any FFI consumer.
//!
//! All exported functions follow the convention:
//! - Return `i32` status code: `WINPILOT_OK=0`, `WINPILOT_ERROR=-1`
//! - String outputs allocated by Rust, freed via `winpilot_free_string()`
//! - Last error retrievable via `winpilot_last_error()`
//!
//! Tool results are the same JSON `ToolResponse` objects the worker emits.
//! A tool that ran but failed still returns `WINPILOT_OK`; inspect
//! `success` in the JSON.  `WINPILOT_ERROR` is reserved for bad arguments
//! and a desktop that could not be initialised.

use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::OnceLock;

use winpilot_core::config::EngineConfig;
use winpilot_core::tools::{Desktop, ScreenshotRequest, ToolResponse};

pub const WINPILOT_OK: i32 = 0;
pub const WINPILOT_ERROR: i32 = -1;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

static DESKTOP: OnceLock<Result<Desktop, String>> = OnceLock::new();

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn desktop() -> Result<&'static Desktop, String> {
    DESKTOP
        .get_or_init(|| {
            Desktop::native(EngineConfig::default()).map_err(|e| {
                log::error!("desktop initialisation failed: {e}");
                e.to_string()
            })
        })
        .as_ref()
        .map_err(Clone::clone)
}

/// Borrow a required C string argument.
///
/// # Safety
///
/// `ptr` must be null or a valid null-terminated C string.
unsafe fn required_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{what} is null"));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| format!("Invalid UTF-8 in {what}: {e}"))
}

/// Like [`required_str`], but null maps to `None`.
///
/// # Safety
///
/// `ptr` must be null or a valid null-terminated C string.
unsafe fn optional_str<'a>(ptr: *const c_char, what: &str) -> Result<Option<&'a str>, String> {
    if ptr.is_null() {
        Ok(None)
    } else {
        unsafe { required_str(ptr, what) }.map(Some)
    }
}

/// Serialize `response` into `*out_json`.
///
/// # Safety
///
/// `out_json` must be a valid, non-null pointer to a `*mut c_char`.
unsafe fn write_response(response: &ToolResponse, out_json: *mut *mut c_char) -> i32 {
    match serde_json::to_string(response) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => {
                unsafe { *out_json = cstr.into_raw() };
                WINPILOT_OK
            }
            Err(e) => {
                set_last_error(&format!("CString conversion failed: {e}"));
                WINPILOT_ERROR
            }
        },
        Err(e) => {
            set_last_error(&format!("JSON serialization failed: {e}"));
            WINPILOT_ERROR
        }
    }
}

/// Shared body of every tool export: check `out_json`, run `f` against the
/// process-wide desktop, and hand back the JSON response.
///
/// # Safety
///
/// `out_json` must be null or a valid pointer to a `*mut c_char`.
unsafe fn run_tool(
    out_json: *mut *mut c_char,
    f: impl FnOnce(&Desktop) -> Result<ToolResponse, String>,
) -> i32 {
    if out_json.is_null() {
        set_last_error("out_json is null");
        return WINPILOT_ERROR;
    }
    unsafe { *out_json = ptr::null_mut() };

    let response = match desktop().and_then(f) {
        Ok(r) => r,
        Err(e) => {
            set_last_error(&e);
            return WINPILOT_ERROR;
        }
    };
    unsafe { write_response(&response, out_json) }
}

/// Retrieve the last error message (thread-local).
///
/// Returns a pointer valid until the next winpilot_* call on this thread.
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn winpilot_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string previously allocated by a winpilot_* function.
///
/// # Safety
///
/// `ptr` must be a pointer returned by a winpilot_* function or null.
#[no_mangle]
pub unsafe extern "C" fn winpilot_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Invoke any tool by method name with JSON params (null means `{}`).
///
/// # Safety
///
/// `method` must be a valid null-terminated UTF-8 C string; `params_json`
/// must be null or one.  `*out_json` receives a heap-allocated string;
/// free with `winpilot_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn winpilot_call(
    method: *const c_char,
    params_json: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    unsafe {
        run_tool(out_json, |desktop| {
            let method = required_str(method, "method")?;
            let params = match optional_str(params_json, "params_json")? {
                Some(raw) => serde_json::from_str(raw)
                    .map_err(|e| format!("Invalid params JSON: {e}"))?,
                None => serde_json::Value::Null,
            };
            Ok(desktop.dispatch_json(method, params))
        })
    }
}

/// Run a macro: `commands_json` is a JSON array of commands, `name` may be
/// null.  Blocks while another macro is running.
///
/// # Safety
///
/// `commands_json` must be a valid null-terminated UTF-8 C string; `name`
/// must be null or one.  `*out_json` receives a heap-allocated string;
/// free with `winpilot_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn winpilot_run_macro(
    commands_json: *const c_char,
    name: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    unsafe {
        run_tool(out_json, |desktop| {
            let commands = required_str(commands_json, "commands_json")?;
            let name = optional_str(name, "name")?;
            Ok(desktop.run_macro(commands, name))
        })
    }
}

/// Whether a macro is currently executing.  Returns 1, 0, or
/// `WINPILOT_ERROR` if the desktop is unavailable.
#[no_mangle]
pub extern "C" fn winpilot_macro_running() -> i32 {
    match desktop() {
        Ok(d) => i32::from(d.engine().is_running()),
        Err(e) => {
            set_last_error(&e);
            WINPILOT_ERROR
        }
    }
}

/// List top-level windows as JSON.
///
/// # Safety
///
/// `*out_json` receives a heap-allocated string; free with
/// `winpilot_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn winpilot_list_windows(include_hidden: bool, out_json: *mut *mut c_char) -> i32 {
    unsafe { run_tool(out_json, |desktop| Ok(desktop.list_windows(include_hidden))) }
}

/// Capture a screenshot to disk.  `request_json` uses the `take_screenshot`
/// params shape (`target`, `screenId`, `windowId`, `windowName`,
/// `filename`); null captures display 0 with a timestamped name.
///
/// # Safety
///
/// `request_json` must be null or a valid null-terminated UTF-8 C string.
/// `*out_json` receives a heap-allocated string; free with
/// `winpilot_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn winpilot_take_screenshot(
    request_json: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    unsafe {
        run_tool(out_json, |desktop| {
            let request: ScreenshotRequest = match optional_str(request_json, "request_json")? {
                Some(raw) => serde_json::from_str(raw)
                    .map_err(|e| format!("Invalid screenshot request: {e}"))?,
                None => ScreenshotRequest::default(),
            };
            Ok(desktop.take_screenshot(&request))
        })
    }
}
