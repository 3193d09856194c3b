pub mod entry;
pub mod feedback;
pub mod public_form;
pub mod question;
