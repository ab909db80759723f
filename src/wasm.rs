#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

use js_sys::Array;
use wasm_bindgen::prelude::*;

use crate::{Packer, SlotId};

/// JS-facing packer. Slots cross the boundary as plain numbers; a number
/// that no longer names a live slot is answered with `undefined`/`false`
/// just like a stale [`SlotId`] on the Rust side.
#[wasm_bindgen]
pub struct Atlas {
    packer: Packer,
}

#[wasm_bindgen]
impl Atlas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: i32, height: i32, pixel_gap: i32) -> Self {
        Self {
            packer: Packer::new(width, height, pixel_gap),
        }
    }

    pub fn insert(&mut self, width: i32, height: i32) -> Option<u32> {
        self.packer.insert(width, height).map(SlotId::to_raw)
    }

    pub fn remove(&mut self, slot: u32) -> bool {
        self.packer.remove(SlotId::from_raw(slot))
    }

    /// The packed rectangle as `[x, y, width, height]`.
    pub fn rect_of(&self, slot: u32) -> Option<Array> {
        self.packer
            .rect(SlotId::from_raw(slot))
            .map(|rect| into_js_array(vec![rect.x, rect.y, rect.width, rect.height]))
    }

    pub fn clear(&mut self) {
        self.packer.clear();
    }

    pub fn width(&self) -> i32 {
        self.packer.width()
    }

    pub fn height(&self) -> i32 {
        self.packer.height()
    }

    pub fn pixel_gap(&self) -> i32 {
        self.packer.pixel_gap()
    }

    pub fn len(&self) -> u32 {
        self.packer.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.packer.is_empty()
    }

    pub fn used_area(&self) -> f64 {
        self.packer.used_area() as f64
    }
}

fn into_js_array<T>(vec: Vec<T>) -> Array
where
    JsValue: From<T>,
{
    vec.into_iter().map(JsValue::from).collect()
}
