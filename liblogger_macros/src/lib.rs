/*
 * Attribute macros that instrument a function through liblogger.
 *
 * Each macro rewrites the body into a closure call so that early `return`s
 * and `?` still pass through the instrumentation. The expanded code calls
 * `liblogger::log_*!`, so the annotated crate must depend on liblogger.
 */

extern crate proc_macro;

mod macro_utils;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, ItemFn};

use crate::macro_utils::{closure_return, get_fn_name, returns_result};

fn reject_async(input_fn: &ItemFn) -> Option<TokenStream> {
    input_fn.sig.asyncness.map(|token| {
        syn::Error::new_spanned(token, "liblogger attributes do not support async fn")
            .to_compile_error()
            .into()
    })
}

/// Logs entry and exit of a function at debug level.
#[proc_macro_attribute]
pub fn log_entry_exit(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut input_fn = parse_macro_input!(input as ItemFn);
    if let Some(error) = reject_async(&input_fn) {
        return error;
    }
    let fn_name = get_fn_name(&input_fn);
    let ret = closure_return(&input_fn);
    let orig_block = input_fn.block.clone();

    input_fn.block = Box::new(parse_quote!({
        liblogger::log_debug!(&format!("ENTRY: {}", #fn_name));
        let result = (|| #ret #orig_block)();
        liblogger::log_debug!(&format!("EXIT: {}", #fn_name));
        result
    }));

    TokenStream::from(quote!(#input_fn))
}

/// Logs an `Err` return (for functions returning a `Result`) and any panic,
/// which is then resumed.
#[proc_macro_attribute]
pub fn log_errors(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut input_fn = parse_macro_input!(input as ItemFn);
    if let Some(error) = reject_async(&input_fn) {
        return error;
    }
    let fn_name = get_fn_name(&input_fn);
    let ret = closure_return(&input_fn);
    let orig_block = input_fn.block.clone();

    let report = if returns_result(&input_fn) {
        quote! {
            if let Err(err) = &output {
                liblogger::log_error!(&format!("{} returned error: {}", #fn_name, err), None);
            }
        }
    } else {
        quote!()
    };

    input_fn.block = Box::new(parse_quote!({
        use std::panic::{catch_unwind, AssertUnwindSafe};

        match catch_unwind(AssertUnwindSafe(|| #ret #orig_block)) {
            Ok(output) => {
                #report
                output
            }
            Err(panic_err) => {
                let panic_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                liblogger::log_error!(&format!("{} panicked: {}", #fn_name, panic_msg), None);
                std::panic::resume_unwind(panic_err);
            }
        }
    }));

    TokenStream::from(quote!(#input_fn))
}

/// Logs the wall-clock duration of every call at debug level, and panics
/// with their elapsed time at error level.
#[proc_macro_attribute]
pub fn measure_time(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut input_fn = parse_macro_input!(input as ItemFn);
    if let Some(error) = reject_async(&input_fn) {
        return error;
    }
    let fn_name = get_fn_name(&input_fn);
    let ret = closure_return(&input_fn);
    let orig_block = input_fn.block.clone();

    input_fn.block = Box::new(parse_quote!({
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let start_time = std::time::Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| #ret #orig_block));
        let elapsed_us = start_time.elapsed().as_micros();

        match result {
            Ok(output) => {
                liblogger::log_debug!(&format!("{} completed in {} us", #fn_name, elapsed_us), None);
                output
            }
            Err(panic_err) => {
                liblogger::log_error!(&format!("{} panicked after {} us", #fn_name, elapsed_us), None);
                std::panic::resume_unwind(panic_err);
            }
        }
    }));

    TokenStream::from(quote!(#input_fn))
}
