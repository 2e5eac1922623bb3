pub mod consultation;
pub mod doctor;
pub mod enums;
pub mod filters;
pub mod notification;
pub mod on_call;
pub mod response_time;
pub mod specialist;

pub use consultation::*;
pub use doctor::*;
pub use enums::*;
pub use filters::*;
pub use notification::*;
pub use on_call::*;
pub use response_time::ResponseTime;
pub use specialist::*;
