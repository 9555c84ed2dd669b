//! Sprite content used by the simulation
//!
//! The renderer owns real textures; the simulation only needs each sprite's
//! size and per-texel alpha for the pixel collision test. Masks are loaded
//! once and shared between every part that uses the sprite.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SimError;

/// Name of the thin rectangle every built-in actor is assembled from
pub const SMALL_RECT: &str = "smallRect";
/// Size of the built-in rectangle sprite (texels)
pub const SMALL_RECT_SIZE: (u32, u32) = (50, 5);

/// Per-texel alpha of a sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    name: String,
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Build a mask from row-major RGBA texels
    pub fn from_rgba(name: impl Into<String>, width: u32, height: u32, texels: &[[u8; 4]]) -> Self {
        debug_assert_eq!(texels.len(), (width * height) as usize);
        Self {
            name: name.into(),
            width,
            height,
            alpha: texels.iter().map(|t| t[3]).collect(),
        }
    }

    /// Fully opaque rectangle
    pub fn solid(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            alpha: vec![u8::MAX; (width * height) as usize],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at texel (x, y); out-of-range texels are transparent
    #[inline]
    pub fn alpha(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.alpha[x as usize + y as usize * self.width as usize]
    }

    #[inline]
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.alpha(x, y) != 0
    }
}

/// Registry of loaded sprite masks
#[derive(Debug, Clone, Default)]
pub struct Content {
    masks: HashMap<String, Arc<AlphaMask>>,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the sprites the built-in actor catalog needs
    pub fn builtin() -> Self {
        let mut content = Self::new();
        content.insert(AlphaMask::solid(SMALL_RECT, SMALL_RECT_SIZE.0, SMALL_RECT_SIZE.1));
        content
    }

    /// Register a mask, replacing any previous mask with the same name
    pub fn insert(&mut self, mask: AlphaMask) {
        self.masks.insert(mask.name().to_string(), Arc::new(mask));
    }

    pub fn get(&self, name: &str) -> Result<Arc<AlphaMask>, SimError> {
        self.masks
            .get(name)
            .cloned()
            .ok_or_else(|| SimError::MissingTexture(name.to_string()))
    }
}
