use std::path::PathBuf;

use image::RgbaImage;
use log::debug;
use ndarray::s;

use crate::config::ViewerConfig;
use crate::display::{ChannelView, DisplaySettings, DisplayTransform, to_rgba8};
use crate::store::{ImageRecord, ImageStore, Result, StoreError};

use super::Zoom;

/// Navigation over an [`ImageStore`]: which image is shown, the one shown
/// before it, the zoom, and the channel view.
#[derive(Debug, Default)]
pub struct ViewerState {
    store: ImageStore,
    current: Option<usize>,
    last_viewed: Option<usize>,
    zoom: Zoom,
    channel: ChannelView,
    config: ViewerConfig,
}

impl ViewerState {
    pub fn new(store: ImageStore, config: ViewerConfig) -> Self {
        Self {
            store,
            current: None,
            last_viewed: None,
            zoom: Zoom::default(),
            channel: ChannelView::FullColor,
            config,
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ImageStore {
        &mut self.store
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn last_viewed(&self) -> Option<usize> {
        self.last_viewed
    }

    pub fn current_record(&self) -> Option<&ImageRecord> {
        self.current.and_then(|index| self.store.get(index))
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn channel(&self) -> ChannelView {
        self.channel
    }

    fn current_nchannels(&self) -> usize {
        self.current_record()
            .and_then(ImageRecord::spec)
            .map(|spec| spec.nchannels)
            .unwrap_or(0)
    }

    /// Registers an image. The current index does not move.
    pub fn add_image(&mut self, path: impl Into<PathBuf>, get_spec: bool) -> usize {
        self.store.register(path, get_spec)
    }

    /// Registers an image, reading its header when the config asks for it.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> usize {
        let load = self.config.load_spec_on_add;
        self.add_image(path, load)
    }

    /// Makes `index` current and loads its pixels. The index changes even
    /// when the load fails; the failure is returned.
    pub fn current_image(&mut self, index: usize) -> Result<()> {
        if index >= self.store.len() {
            return Err(StoreError::index_out_of_range(index, self.store.len()));
        }
        if self.current != Some(index) {
            if self.current.is_some() {
                self.last_viewed = self.current;
            }
            self.current = Some(index);
            debug!("viewing image {index}");
        }
        let loaded = self.store.ensure_pixels(index, false, None);
        let nchannels = self.current_nchannels();
        if matches!(self.channel, ChannelView::Channel(channel) if channel >= nchannels) {
            self.channel = ChannelView::FullColor;
        }
        loaded
    }

    pub fn next_image(&mut self) -> Result<()> {
        let count = self.store.len();
        if count == 0 {
            return Ok(());
        }
        let next = self.current.map_or(0, |current| (current + 1) % count);
        self.current_image(next)
    }

    pub fn prev_image(&mut self) -> Result<()> {
        let count = self.store.len();
        if count == 0 {
            return Ok(());
        }
        let prev = self
            .current
            .map_or(count - 1, |current| (current + count - 1) % count);
        self.current_image(prev)
    }

    /// Swaps with the previously viewed image.
    pub fn toggle_image(&mut self) -> Result<()> {
        match self.last_viewed {
            Some(last) => self.current_image(last),
            None => Ok(()),
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in(&self.config.zoom_limits());
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out(&self.config.zoom_limits());
    }

    pub fn normal_size(&mut self) {
        self.zoom.normal_size();
    }

    /// Sets the signed zoom (`2` doubles, `-2` halves).
    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        let magnification = Zoom::magnification_from_signed(zoom)
            .ok_or_else(|| StoreError::InvalidState(format!("zoom {zoom} is not meaningful")))?;
        self.zoom
            .set_magnification(magnification, &self.config.zoom_limits());
        Ok(())
    }

    /// Fits the current image into a window. Without a known spec the zoom
    /// is left alone.
    pub fn fit_image_to_window(&mut self, window_width: f32, window_height: f32) {
        let Some(spec) = self.current_record().and_then(ImageRecord::spec) else {
            return;
        };
        let (width, height) = (spec.width, spec.height);
        self.zoom.fit_to_window(
            window_width,
            window_height,
            width,
            height,
            &self.config.zoom_limits(),
        );
    }

    pub fn view_channel(&mut self, channel: ChannelView) -> Result<()> {
        let nchannels = self.current_nchannels();
        if let ChannelView::Channel(index) = channel {
            if index >= nchannels {
                return Err(StoreError::InvalidState(format!(
                    "channel {index} out of range ({nchannels} channels)"
                )));
            }
        }
        self.channel = channel;
        Ok(())
    }

    pub fn view_channel_next(&mut self) {
        self.channel = self.channel.next(self.current_nchannels());
    }

    pub fn view_channel_prev(&mut self) {
        self.channel = self.channel.prev(self.current_nchannels());
    }

    /// Removes the current image and shows its predecessor (or the new first
    /// image when the first one was closed).
    pub fn close_image(&mut self) -> Result<()> {
        let Some(closed) = self.current else {
            return Ok(());
        };
        let record = self.store.remove(closed)?;
        debug!("closed {}", record.name());

        self.current = if self.store.is_empty() {
            None
        } else {
            Some(closed.saturating_sub(1))
        };
        self.last_viewed = match self.last_viewed {
            Some(last) if last == closed => None,
            Some(last) if last > closed => Some(last - 1),
            other => other,
        };
        if self.last_viewed == self.current {
            self.last_viewed = None;
        }
        match self.current {
            Some(index) => self.store.ensure_pixels(index, false, None),
            None => Ok(()),
        }
    }

    /// Re-reads the current image from disk.
    pub fn reload(&mut self) -> Result<()> {
        match self.current {
            Some(index) => self.store.ensure_pixels(index, true, None),
            None => Ok(()),
        }
    }

    fn adjust_display(&mut self, adjust: impl FnOnce(&mut DisplaySettings)) {
        if let Some(record) = self.current.and_then(|index| self.store.get_mut(index)) {
            adjust(record.display_mut());
        }
    }

    pub fn gamma_plus(&mut self) {
        self.adjust_display(DisplaySettings::gamma_plus);
    }

    pub fn gamma_minus(&mut self) {
        self.adjust_display(DisplaySettings::gamma_minus);
    }

    pub fn exposure_plus_tenth_stop(&mut self) {
        self.adjust_display(DisplaySettings::exposure_plus_tenth_stop);
    }

    pub fn exposure_minus_tenth_stop(&mut self) {
        self.adjust_display(DisplaySettings::exposure_minus_tenth_stop);
    }

    pub fn exposure_plus_half_stop(&mut self) {
        self.adjust_display(DisplaySettings::exposure_plus_half_stop);
    }

    pub fn exposure_minus_half_stop(&mut self) {
        self.adjust_display(DisplaySettings::exposure_minus_half_stop);
    }

    pub fn display_transform(&self) -> DisplayTransform {
        match self.current_record() {
            Some(record) => record.display_transform(self.channel),
            None => DisplayTransform::default(),
        }
    }

    /// Renders the first slice of the current image through its display
    /// transform.
    pub fn display_current(&mut self) -> Result<RgbaImage> {
        let index = self
            .current
            .ok_or_else(|| StoreError::InvalidState("no current image".into()))?;
        self.store.ensure_pixels(index, false, None)?;
        let transform = self.display_transform();
        let record = self
            .store
            .get(index)
            .ok_or_else(|| StoreError::index_out_of_range(index, self.store.len()))?;
        let (Some(spec), Some(pixels)) = (record.spec(), record.pixels()) else {
            return Err(StoreError::InvalidState("pixels unavailable".into()));
        };
        let rendered = transform.render(spec, pixels)?;
        Ok(to_rgba8(
            &rendered.slice(s![0..spec.height, .., ..]).to_owned(),
        ))
    }

    /// Thumbnail of the current image, bounded by the configured size.
    pub fn current_thumbnail(&mut self) -> Result<&RgbaImage> {
        let index = self
            .current
            .ok_or_else(|| StoreError::InvalidState("no current image".into()))?;
        self.store.ensure_thumbnail(index, self.config.thumbnail_size)
    }
}
