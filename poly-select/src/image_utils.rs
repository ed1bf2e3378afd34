use image::DynamicImage;

/// Decode an image file's bytes. Decoding errors become `InvalidData`.
pub fn load_image(bytes: &[u8]) -> std::io::Result<DynamicImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Image has no pixels",
        ));
    }
    Ok(image)
}

/// Unmultiplied RGBA bytes in row-major order, ready to upload as a texture.
pub fn rgba_pixels(image: &DynamicImage) -> ([usize; 2], Vec<u8>) {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    (size, rgba.into_raw())
}
