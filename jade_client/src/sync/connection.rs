use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream},
    time::Duration,
};

#[derive(Debug)]
pub enum Connection {
    TcpStream(TcpStream),

    #[cfg(test)]
    PartialReadTest {
        data: Vec<u8>,
        status: usize,
    },

    /// Answers with `data` but refuses any finite read timeout.
    #[cfg(test)]
    TimeoutRefusedTest { data: Vec<u8> },
}

impl Connection {
    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Connection::TcpStream(stream) => stream.write_all(buf),

            #[cfg(test)]
            Connection::PartialReadTest { data: _, status: _ } => Ok(()),

            #[cfg(test)]
            Connection::TimeoutRefusedTest { data: _ } => Ok(()),
        }
    }

    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::TcpStream(stream) => stream.read(buf),

            #[cfg(test)]
            Connection::PartialReadTest { data, status } => match status {
                0 => {
                    buf[0] = data[0];
                    *status = 1;
                    Ok(1)
                }
                1 => {
                    *status = 2;
                    Err(io::Error::new(io::ErrorKind::Interrupted, "oh no!"))
                }
                _ => {
                    buf[..data.len() - 1].copy_from_slice(&data[1..]);
                    Ok(data.len() - 1)
                }
            },

            #[cfg(test)]
            Connection::TimeoutRefusedTest { data } => {
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
        }
    }

    /// `None` blocks until the device answers.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Connection::TcpStream(stream) => stream.set_read_timeout(timeout),

            #[cfg(test)]
            Connection::PartialReadTest { data: _, status: _ } => Ok(()),

            #[cfg(test)]
            Connection::TimeoutRefusedTest { data: _ } => match timeout {
                Some(_) => Err(io::Error::new(io::ErrorKind::Other, "no timeouts here")),
                None => Ok(()),
            },
        }
    }

    pub fn shutdown(&mut self) -> io::Result<()> {
        match self {
            Connection::TcpStream(stream) => match stream.shutdown(Shutdown::Both) {
                Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
                r => r,
            },

            #[cfg(test)]
            Connection::PartialReadTest { data: _, status: _ } => Ok(()),

            #[cfg(test)]
            Connection::TimeoutRefusedTest { data: _ } => Ok(()),
        }
    }
}

impl From<TcpStream> for Connection {
    fn from(stream: TcpStream) -> Self {
        Connection::TcpStream(stream)
    }
}
