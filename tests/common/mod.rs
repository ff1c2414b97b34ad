#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::error::{Diagnostics, Status};
use rox::Lox;

/// A `Write` sink the test keeps a handle to after giving it away.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("print output is UTF-8")
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Result of running one program through a fresh session.
pub struct Outcome {
    pub status: Status,
    pub output: Vec<String>,
    pub errors: Vec<String>,
}

pub fn run(source: &str) -> Outcome {
    let buf = SharedBuf::default();
    let mut lox = Lox::with_output(Box::new(buf.clone()));
    let mut diagnostics = Diagnostics::new();

    let status = lox.run(source, &mut diagnostics);

    Outcome {
        status,
        output: buf.lines(),
        errors: diagnostics.errors().iter().map(|e| e.to_string()).collect(),
    }
}
