mod appendable;
mod shared_buffer;

pub use appendable::Appendable;
pub use shared_buffer::SharedBuffer;
