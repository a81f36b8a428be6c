//! FFI bindings for Synheart Persona
//!
//! This module provides C-compatible functions for embedding the engine in
//! host environments (game engines, native shells). All functions use C
//! strings (null-terminated) and return allocated memory that must be freed
//! by the caller using `persona_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::evaluator::RuleEvaluator;
use crate::tracker::InteractionTracker;
use crate::types::{BehavioralProfile, Point2D};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Tracker API
// ============================================================================

/// Opaque handle to an InteractionTracker
pub struct PersonaTrackerHandle {
    tracker: InteractionTracker,
}

/// Create a new tracker on the system clock. A session starts immediately.
///
/// # Safety
/// - Returns a pointer to a newly allocated tracker.
/// - Must be freed with `persona_tracker_free`.
#[no_mangle]
pub unsafe extern "C" fn persona_tracker_new() -> *mut PersonaTrackerHandle {
    clear_last_error();
    let handle = Box::new(PersonaTrackerHandle {
        tracker: InteractionTracker::new(),
    });
    Box::into_raw(handle)
}

/// Free a tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn persona_tracker_free(tracker: *mut PersonaTrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

/// Reset all metrics and start a fresh session.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn persona_start_session(tracker: *mut PersonaTrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    (*tracker).tracker.start_session();
    0
}

/// Feed one pointer sample.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn persona_track_movement(
    tracker: *mut PersonaTrackerHandle,
    x: f64,
    y: f64,
) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    (*tracker).tracker.track_movement(Point2D::new(x, y));
    0
}

/// Record a click.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn persona_record_click(tracker: *mut PersonaTrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    (*tracker).tracker.record_click();
    0
}

/// Mark the moment a decision point became visible.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn persona_start_decision_step(tracker: *mut PersonaTrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    (*tracker).tracker.start_decision_step();
    0
}

/// Record completion of the current decision step.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn persona_record_step_completion(
    tracker: *mut PersonaTrackerHandle,
) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    (*tracker).tracker.record_step_completion();
    0
}

/// Record a revision.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn persona_record_revision(tracker: *mut PersonaTrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    (*tracker).tracker.record_revision();
    0
}

/// Upsert a contextual choice.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - `key` and `value` must be valid null-terminated C strings.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn persona_record_choice(
    tracker: *mut PersonaTrackerHandle,
    key: *const c_char,
    value: *const c_char,
) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    let key_str = match cstr_to_string(key) {
        Some(s) => s,
        None => {
            set_last_error("Invalid key string pointer");
            return -1;
        }
    };

    let value_str = match cstr_to_string(value) {
        Some(s) => s,
        None => {
            set_last_error("Invalid value string pointer");
            return -1;
        }
    };

    (*tracker).tracker.record_choice(key_str, value_str);
    0
}

/// Snapshot the current behavioral profile as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `persona_tracker_new`.
/// - Returns a newly allocated string that must be freed with
///   `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn persona_profile_json(tracker: *mut PersonaTrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let profile = (*tracker).tracker.behavioral_profile();
    match serde_json::to_string(&profile) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Evaluation API
// ============================================================================

/// Evaluate a profile JSON with the rule path and fixed-placeholder
/// confidence, returning the evaluation result as JSON.
///
/// # Safety
/// - `profile_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn persona_evaluate_json(
    profile_json: *const c_char,
    session_count: u64,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(profile_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid profile JSON string pointer");
            return ptr::null_mut();
        }
    };

    let profile: BehavioralProfile = match serde_json::from_str(&json_str) {
        Ok(p) => p,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let result = RuleEvaluator::evaluate_behavior(&profile, session_count);
    match serde_json::to_string(&result) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Persona functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Persona function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn persona_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Persona function call on
///   this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn persona_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Persona library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn persona_version() -> *const c_char {
    // Use a static CString to avoid allocation
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
