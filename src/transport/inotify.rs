// src/transport/inotify.rs

use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use tracing::debug;

use super::{Readiness, Transport};
use crate::event::EventMask;
use crate::types::{Timeout, WatchHandle};

/// [`Transport`] backed by a Linux inotify descriptor.
#[derive(Debug)]
pub struct InotifyTransport {
    fd: Option<OwnedFd>,
}

impl InotifyTransport {
    pub fn open() -> io::Result<Self> {
        // SAFETY: plain syscall, no pointers involved.
        let fd = unsafe { libc::inotify_init1(libc::IN_CLOEXEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        debug!(fd, "opened inotify instance");
        // SAFETY: `fd` was just returned by inotify_init1 and nothing else owns it.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Self { fd: Some(fd) })
    }

    fn raw(&self) -> io::Result<RawFd> {
        self.fd
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EBADF))
    }
}

impl Transport for InotifyTransport {
    fn add_watch(&self, path: &str, mask: EventMask) -> io::Result<WatchHandle> {
        let fd = self.raw()?;
        let c_path =
            CString::new(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // SAFETY: `c_path` is a NUL-terminated string that outlives the call.
        let wd = unsafe { libc::inotify_add_watch(fd, c_path.as_ptr(), mask.bits()) };
        if wd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(wd)
    }

    fn remove_watch(&self, handle: WatchHandle) -> io::Result<()> {
        let fd = self.raw()?;
        // SAFETY: plain syscall on a descriptor we own.
        if unsafe { libc::inotify_rm_watch(fd, handle) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn wait_readable(&self, timeout: Timeout) -> io::Result<Readiness> {
        let mut pfd = libc::pollfd {
            fd: self.raw()?,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: `pfd` is a single valid pollfd living on the stack for the call.
        let ready = unsafe { libc::poll(&mut pfd, 1, timeout.as_millis()) };
        match ready {
            r if r < 0 => Err(io::Error::last_os_error()),
            0 => Ok(Readiness::TimedOut),
            _ => Ok(Readiness::Ready),
        }
    }

    fn bytes_available(&self) -> io::Result<usize> {
        let fd = self.raw()?;
        let mut pending: libc::c_int = 0;
        // SAFETY: FIONREAD writes one c_int through the pointer, which targets `pending`.
        if unsafe { libc::ioctl(fd, libc::FIONREAD, &mut pending as *mut libc::c_int) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(pending.max(0) as usize)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let fd = self.raw()?;
        // SAFETY: the kernel writes at most `buf.len()` bytes into `buf`.
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(fd) = self.fd.take() {
            debug!(fd = fd.as_raw_fd(), "closing inotify instance");
        }
        Ok(())
    }
}
