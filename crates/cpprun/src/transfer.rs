use std::fmt;
use std::fs::File;
use std::io;

/// Largest count a single `sendfile(2)` call will move on Linux.
#[cfg(target_os = "linux")]
const MAX_SENDFILE_CHUNK: usize = 0x7fff_f000;

#[derive(Debug)]
pub enum TransferError {
    Metadata(io::Error),
    Copy {
        sent: u64,
        expected: u64,
        source: io::Error,
    },
    /// A request moved zero bytes while some were still outstanding.
    Stalled { sent: u64, expected: u64 },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Metadata(_) => f.write_str("query source size"),
            TransferError::Copy { sent, expected, .. } => {
                write!(f, "copy failed after {sent} of {expected} bytes")
            }
            TransferError::Stalled { sent, expected } => {
                write!(
                    f,
                    "source ended after {sent} of {expected} bytes (file changed while staging?)"
                )
            }
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Metadata(err) => Some(err),
            TransferError::Copy { source, .. } => Some(source),
            TransferError::Stalled { .. } => None,
        }
    }
}

/// Copy the full current length of `src` into `dst` at `dst`'s current
/// offset. All-or-nothing from the caller's point of view: either every byte
/// measured up front lands in `dst`, or an error is returned.
pub fn transfer_all(src: &File, dst: &File) -> Result<u64, TransferError> {
    let len = src.metadata().map_err(TransferError::Metadata)?.len();
    copy_exact(src, dst, len)?;
    Ok(len)
}

#[cfg(target_os = "linux")]
fn copy_exact(src: &File, dst: &File, len: u64) -> Result<(), TransferError> {
    use std::os::fd::AsRawFd as _;

    let mut sent: u64 = 0;
    while sent < len {
        let want = (len - sent).min(MAX_SENDFILE_CHUNK as u64) as usize;
        // SAFETY: both descriptors are borrowed from live `File`s for the
        // duration of the call; a null offset uses and advances the source's
        // own file position.
        let n = unsafe {
            libc::sendfile(dst.as_raw_fd(), src.as_raw_fd(), std::ptr::null_mut(), want)
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(libc::EINVAL) | Some(libc::ENOSYS) if sent == 0 => {
                    log::debug!("sendfile unavailable ({err}); using buffered copy");
                    return buffered_copy(src, dst, len);
                }
                _ => {
                    return Err(TransferError::Copy {
                        sent,
                        expected: len,
                        source: err,
                    })
                }
            }
        }
        if n == 0 {
            return Err(TransferError::Stalled {
                sent,
                expected: len,
            });
        }
        sent += n as u64;
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn copy_exact(src: &File, dst: &File, len: u64) -> Result<(), TransferError> {
    buffered_copy(src, dst, len)
}

fn buffered_copy(src: &File, mut dst: &File, len: u64) -> Result<(), TransferError> {
    use std::io::Read as _;

    let mut reader = src.take(len);
    let sent = io::copy(&mut reader, &mut dst).map_err(|source| TransferError::Copy {
        sent: 0,
        expected: len,
        source,
    })?;
    if sent < len {
        return Err(TransferError::Stalled {
            sent,
            expected: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Read as _, Seek as _, Write as _};

    use super::*;

    fn source_file(dir: &std::path::Path, bytes: &[u8]) -> File {
        let path = dir.join("src.cpp");
        std::fs::write(&path, bytes).expect("write source");
        File::open(&path).expect("open source")
    }

    fn read_back(mut f: File) -> Vec<u8> {
        f.rewind().expect("rewind");
        let mut out = Vec::new();
        f.read_to_end(&mut out).expect("read back");
        out
    }

    #[test]
    fn copies_after_existing_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = source_file(dir.path(), b"#!/usr/bin/env cpprun\nint main() {}\n");
        let mut dst = tempfile::tempfile().expect("dst");
        dst.write_all(b"//").expect("prefix");

        let n = transfer_all(&src, &dst).expect("transfer");
        assert_eq!(n, 36);
        assert_eq!(read_back(dst), b"//#!/usr/bin/env cpprun\nint main() {}\n");
    }

    #[test]
    fn empty_source_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = source_file(dir.path(), b"");
        let dst = tempfile::tempfile().expect("dst");

        assert_eq!(transfer_all(&src, &dst).expect("transfer"), 0);
        assert!(read_back(dst).is_empty());
    }

    #[test]
    fn large_source_round_trips_byte_for_byte() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bytes: Vec<u8> = (0..3 * 1024 * 1024 + 17).map(|i| (i % 251) as u8).collect();
        let src = source_file(dir.path(), &bytes);
        let dst = tempfile::tempfile().expect("dst");

        assert_eq!(
            transfer_all(&src, &dst).expect("transfer"),
            bytes.len() as u64
        );
        assert_eq!(read_back(dst), bytes);
    }

    #[test]
    fn short_source_is_reported_as_stalled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = source_file(dir.path(), b"abc");
        let dst = tempfile::tempfile().expect("dst");

        let err = copy_exact(&src, &dst, 10).expect_err("must not loop forever");
        match err {
            TransferError::Stalled { sent, expected } => {
                assert_eq!(sent, 3);
                assert_eq!(expected, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn metadata_failure_names_the_size_query() {
        let err = TransferError::Metadata(io::Error::new(io::ErrorKind::Other, "EBADF"));
        assert_eq!(err.to_string(), "query source size");
        let source = std::error::Error::source(&err).expect("io error as source");
        assert_eq!(source.to_string(), "EBADF");
    }

    #[test]
    fn write_failure_surfaces_underlying_cause() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = source_file(dir.path(), b"int main() {}\n");
        let dst_path = dir.path().join("dst");
        std::fs::write(&dst_path, b"").expect("create dst");
        let read_only = File::open(&dst_path).expect("open dst read-only");

        let err = transfer_all(&src, &read_only).expect_err("dst is not writable");
        assert!(matches!(err, TransferError::Copy { .. }), "err={err:?}");
        assert!(std::error::Error::source(&err).is_some());
    }
}
