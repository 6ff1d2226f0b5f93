pub(crate) mod perm;
pub use self::perm::{Perm, Permute};

pub(crate) mod symmops;
pub use self::symmops::{CartOp, FracOp};
