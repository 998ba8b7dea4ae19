use std::io::{self, BufRead, BufReader, PipeReader};
use std::process::Stdio;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::process::log_buffer::LogBuffer;

/// One pipe installed as both stdout and stderr of a child, so the reader
/// sees the two streams in the order the child wrote them.
pub struct MergedOutput {
    pub reader: PipeReader,
    pub stdout: Stdio,
    pub stderr: Stdio,
}

pub fn merged_pipe() -> io::Result<MergedOutput> {
    let (reader, writer) = io::pipe()?;
    let stderr = writer.try_clone()?;
    Ok(MergedOutput {
        reader,
        stdout: writer.into(),
        stderr: stderr.into(),
    })
}

/// Drains `pipe` into `logs` one line at a time until every write end is
/// closed. The thread ends on its own; nothing needs to cancel it.
pub fn spawn_reader(service: &str, pipe: PipeReader, logs: LogBuffer) -> io::Result<JoinHandle<()>> {
    let service = service.to_string();
    thread::Builder::new()
        .name(format!("{}-output", service))
        .spawn(move || {
            let lines = pump_lines(BufReader::new(pipe), &logs);
            debug!(service = %service, lines, "output stream closed");
        })
}

fn pump_lines<R: BufRead>(mut reader: R, logs: &LogBuffer) -> usize {
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return count,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                logs.append(line.trim_end());
                count += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "output read failed");
                return count;
            }
        }
    }
}
