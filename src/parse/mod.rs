mod token;
pub use token::*;

mod atom;
pub use atom::*;

mod sphere;
pub use sphere::*;
