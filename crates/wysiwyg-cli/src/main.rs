use std::process;

use wysiwyg_core::ExitCode;

fn main() {
    match wysiwyg_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("wysiwyg error: {err:#}");
            process::exit(ExitCode::Config as i32);
        }
    }
}
