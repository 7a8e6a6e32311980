//! End-to-end tests driving the pipelines against stub DNS and real sockets.

#[cfg(test)]
mod support;

#[cfg(test)]
mod discover;
#[cfg(test)]
mod scan;
#[cfg(test)]
mod takeover;
#[cfg(test)]
mod wildcard;
