use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use crate::error::BackendError;

/// Run `program`, feed `input` on stdin, and return stdout on success.
pub(crate) fn run_with_stdin(
    program: &str,
    args: &[String],
    envs: &[(&str, String)],
    input: Vec<u8>,
) -> Result<String, BackendError> {
    let spawn_err =
        |source: std::io::Error| BackendError::Spawn { program: program.to_string(), source };
    let mut child = Command::new(program)
        .args(args)
        .envs(envs.iter().map(|(key, value)| (*key, value.as_str())))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;

    // Written from a separate thread so a large prompt cannot deadlock against a full stdout pipe.
    let writer = child.stdin.take().map(|mut stdin| {
        thread::spawn(move || {
            let _ = stdin.write_all(&input);
        })
    });

    let output = child.wait_with_output().map_err(spawn_err)?;
    if let Some(writer) = writer {
        let _ = writer.join();
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BackendError::Exit {
            program: program.to_string(),
            status: output.status.to_string(),
            detail: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
