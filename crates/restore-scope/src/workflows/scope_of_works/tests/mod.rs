mod area;
mod common;
mod equipment;
mod signals;
