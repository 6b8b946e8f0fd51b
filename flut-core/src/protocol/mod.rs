//! Pixelflut viewer wire protocol.
//!
//! Every message is a single line of UTF-8 text with space-separated
//! fields. The client only ever asks; the server only ever reports.
//!
//! | Direction     | Message                      |
//! |---------------|------------------------------|
//! | client→server | `SIZE`                       |
//! | server→client | `SIZE <w> <h>`               |
//! | client→server | `STATE <encoding>`           |
//! | server→client | `STATE <encoding> <payload>` |

pub mod request;
pub mod response;

pub use request::{ClientRequest, Encoding};
pub use response::ServerMessage;
