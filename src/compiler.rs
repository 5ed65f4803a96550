//! @ai:module:intent Run the compiler and feed its output streams into a correlator
//! @ai:module:layer infrastructure
//! @ai:module:public_api CompilerInvocation, CompileOutcome, feed_reader
//! @ai:module:depends_on correlator, config, error

use crate::config::Config;
use crate::correlator::Correlator;
use crate::error::{Error, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

/// @ai:intent Fully resolved compiler command line
#[derive(Debug, Clone)]
pub struct CompilerInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub echo: bool,
}

/// @ai:intent Result of running the compiler to completion
#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub lines: usize,
    pub diagnostic_lines: usize,
}

impl CompilerInvocation {
    /// @ai:intent Build the invocation for one source file from configuration
    /// @ai:post args = [verbosity flag] ++ config.flags ++ [source]
    pub fn from_config(config: &Config, source: &str, workdir: PathBuf) -> Result<Self> {
        let mut args = Vec::with_capacity(config.flags.len() + 2);
        if let Some(flag) = config.verbosity_flag()? {
            args.push(flag);
        }
        args.extend(config.flags.iter().cloned());
        args.push(source.to_string());

        Ok(Self {
            program: config.fpc.clone(),
            args,
            workdir,
            echo: true,
        })
    }

    /// @ai:intent Spawn the compiler and feed stdout and stderr lines as they arrive
    /// @ai:post every line either stream produced has been fed exactly once
    /// @ai:effects process:spawn, io
    pub fn run(&self, correlator: &mut Correlator) -> Result<CompileOutcome> {
        tracing::info!(program = %self.program, args = ?self.args, workdir = %self.workdir.display(), "running compiler");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        let (tx, rx) = mpsc::channel::<String>();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        let mut outcome = CompileOutcome::default();
        for line in rx {
            outcome.lines += 1;
            if self.echo {
                eprintln!("{line}");
            }
            if correlator.feed_line(&line) {
                outcome.diagnostic_lines += 1;
            }
        }

        for reader in readers {
            if reader.join().is_err() {
                tracing::warn!("compiler output reader thread panicked");
            }
        }

        let status = child.wait()?;
        outcome.success = status.success();
        outcome.exit_code = status.code();

        tracing::info!(
            exit_code = ?outcome.exit_code,
            lines = outcome.lines,
            diagnostics = outcome.diagnostic_lines,
            "compiler finished"
        );
        Ok(outcome)
    }
}

/// @ai:intent Forward lines from a child stream into a channel on a background thread
/// @ai:edge_cases bytes that are not valid UTF-8 are replaced rather than aborting the stream
fn forward_lines<R>(stream: R, tx: mpsc::Sender<String>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buffer)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read compiler output");
                    break;
                }
            }
        }
    })
}

/// @ai:intent Feed a captured compiler log through the correlator
/// @ai:effects io
pub fn feed_reader<R: BufRead>(mut reader: R, correlator: &mut Correlator) -> Result<CompileOutcome> {
    let mut outcome = CompileOutcome {
        success: true,
        ..Default::default()
    };
    let mut buffer = Vec::new();

    while reader.read_until(b'\n', &mut buffer)? > 0 {
        let line = String::from_utf8_lossy(&buffer);
        outcome.lines += 1;
        if correlator.feed_line(line.trim_end_matches(['\r', '\n'])) {
            outcome.diagnostic_lines += 1;
        }
        buffer.clear();
    }

    Ok(outcome)
}
