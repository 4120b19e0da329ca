//! Storefront regions.
//!
//! One async trait per region with exactly one implementation each. Page
//! objects hold nothing but their locators; every operation takes the
//! session explicitly and re-queries the page.

pub mod checkout;
pub mod home;
pub mod login;
pub mod navbar;
pub mod product;

pub use checkout::{CheckoutPage, CheckoutRegion};
pub use home::{HomePage, HomeRegion};
pub use login::{LoginPage, LoginRegion};
pub use navbar::{Navbar, NavbarRegion, SearchResults};
pub use product::{ProductPage, ProductRegion};
