use std::error::Error;

/// The single clipboard operation the screen needs.
pub fn copy(text: &str) -> Result<(), Box<dyn Error>> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_owned())?;
    Ok(())
}
