use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tokio::runtime::Handle;

pub enum ImageState {
    Loading,
    Ready(TextureHandle),
    Failed,
}

struct ImageFetched {
    url: String,
    result: Result<ColorImage, String>,
}

/// Downloads resolved photo URLs once and keeps them as textures.
pub struct ImageCache {
    client: reqwest::Client,
    runtime: Handle,
    tx: Sender<ImageFetched>,
    rx: Receiver<ImageFetched>,
    images: HashMap<String, ImageState>,
}

impl ImageCache {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client: reqwest::Client::new(),
            runtime,
            tx,
            rx,
            images: HashMap::new(),
        }
    }

    pub fn get(&mut self, ctx: &egui::Context, url: &str) -> &ImageState {
        if !self.images.contains_key(url) {
            self.spawn_fetch(ctx, url);
            self.images.insert(url.to_string(), ImageState::Loading);
        }
        &self.images[url]
    }

    pub fn drain(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(fetched) => {
                    let state = match fetched.result {
                        Ok(image) => ImageState::Ready(ctx.load_texture(
                            fetched.url.clone(),
                            image,
                            TextureOptions::LINEAR,
                        )),
                        Err(err) => {
                            log::warn!("failed to load image {}: {err}", fetched.url);
                            ImageState::Failed
                        }
                    };
                    self.images.insert(fetched.url, state);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn spawn_fetch(&self, ctx: &egui::Context, url: &str) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let url = url.to_string();
        self.runtime.spawn(async move {
            let result = fetch_image(&client, &url).await;
            let _ = tx.send(ImageFetched { url, result });
            ctx.request_repaint();
        });
    }
}

async fn fetch_image(client: &reqwest::Client, url: &str) -> Result<ColorImage, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| format!("download failed: {err}"))?;
    if !response.status().is_success() {
        return Err(format!("download failed with status: {}", response.status()));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| format!("failed to read response: {err}"))?;
    decode_image(&bytes)
}

fn decode_image(bytes: &[u8]) -> Result<ColorImage, String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| format!("decode failed: {err}"))?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::decode_image;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn decode_image_keeps_dimensions() {
        let source = RgbaImage::from_pixel(3, 2, Rgba([200, 10, 10, 255]));
        let mut png = Cursor::new(Vec::new());
        source
            .write_to(&mut png, ImageFormat::Png)
            .expect("png fixture should encode");

        let image = decode_image(png.get_ref()).expect("png should decode");
        assert_eq!(image.size, [3, 2]);
    }

    #[test]
    fn decode_image_rejects_non_images() {
        assert!(decode_image(b"not an image").is_err());
    }
}
