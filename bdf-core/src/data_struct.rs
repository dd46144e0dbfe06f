//! The `dataStruct` of a BDF header and its spectral window image graph.

use crate::binary_part::{AttachmentKind, AutoDataBinaryPart, BinaryPart, ZeroLagsBinaryPart};
use crate::enums::AtmPhaseCorrection;
use crate::error::{ModelError, Result};
use crate::spectral::{Baseband, SpectralWindow, spw_token};
use std::collections::BTreeMap;

/// Coordinate of a spectral window: baseband index and window index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpwCoord {
    /// Baseband index.
    pub baseband: usize,
    /// Spectral window index within the baseband.
    pub spw: usize,
}

impl SpwCoord {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(baseband: usize, spw: usize) -> Self {
        Self { baseband, spw }
    }
}

/// Structure of the binary data of one subscan.
///
/// Besides the basebands and the six attachment descriptors, a `DataStruct`
/// owns the image graph: each spectral window has at most one image and is
/// the image of at most one other window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStruct {
    apc: Vec<AtmPhaseCorrection>,
    basebands: Vec<Baseband>,
    flags: BinaryPart,
    actual_times: BinaryPart,
    actual_durations: BinaryPart,
    zero_lags: ZeroLagsBinaryPart,
    cross_data: BinaryPart,
    auto_data: AutoDataBinaryPart,
    images: BTreeMap<SpwCoord, SpwCoord>,
    images_of: BTreeMap<SpwCoord, SpwCoord>,
}

impl DataStruct {
    /// Creates a data structure with the given basebands and no attachments.
    #[must_use]
    pub fn new(basebands: Vec<Baseband>) -> Self {
        Self {
            basebands,
            ..Self::default()
        }
    }

    /// Sets the atmospheric phase correction codes.
    #[must_use]
    pub fn with_apc(mut self, apc: Vec<AtmPhaseCorrection>) -> Self {
        self.apc = apc;
        self
    }

    /// Sets the flags descriptor.
    #[must_use]
    pub fn with_flags(mut self, flags: BinaryPart) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the actualTimes descriptor.
    #[must_use]
    pub fn with_actual_times(mut self, actual_times: BinaryPart) -> Self {
        self.actual_times = actual_times;
        self
    }

    /// Sets the actualDurations descriptor.
    #[must_use]
    pub fn with_actual_durations(mut self, actual_durations: BinaryPart) -> Self {
        self.actual_durations = actual_durations;
        self
    }

    /// Sets the zeroLags descriptor.
    #[must_use]
    pub fn with_zero_lags(mut self, zero_lags: ZeroLagsBinaryPart) -> Self {
        self.zero_lags = zero_lags;
        self
    }

    /// Sets the crossData descriptor.
    #[must_use]
    pub fn with_cross_data(mut self, cross_data: BinaryPart) -> Self {
        self.cross_data = cross_data;
        self
    }

    /// Sets the autoData descriptor.
    #[must_use]
    pub fn with_auto_data(mut self, auto_data: AutoDataBinaryPart) -> Self {
        self.auto_data = auto_data;
        self
    }

    /// Atmospheric phase correction states, empty when cross data are absent.
    #[must_use]
    pub fn apc(&self) -> &[AtmPhaseCorrection] {
        &self.apc
    }

    /// Basebands in document order.
    #[must_use]
    pub fn basebands(&self) -> &[Baseband] {
        &self.basebands
    }

    /// Declaration of the flags attachment.
    #[must_use]
    pub const fn flags(&self) -> &BinaryPart {
        &self.flags
    }

    /// Declaration of the actualTimes attachment.
    #[must_use]
    pub const fn actual_times(&self) -> &BinaryPart {
        &self.actual_times
    }

    /// Declaration of the actualDurations attachment.
    #[must_use]
    pub const fn actual_durations(&self) -> &BinaryPart {
        &self.actual_durations
    }

    /// Declaration of the zeroLags attachment and its correlator type.
    #[must_use]
    pub const fn zero_lags(&self) -> &ZeroLagsBinaryPart {
        &self.zero_lags
    }

    /// Declaration of the crossData attachment.
    #[must_use]
    pub const fn cross_data(&self) -> &BinaryPart {
        &self.cross_data
    }

    /// Declaration of the autoData attachment.
    #[must_use]
    pub const fn auto_data(&self) -> &AutoDataBinaryPart {
        &self.auto_data
    }

    /// Declared number of values of an attachment (0 when not declared).
    #[must_use]
    pub const fn declared_size(&self, kind: AttachmentKind) -> u32 {
        match kind {
            AttachmentKind::Flags => self.flags.size(),
            AttachmentKind::ActualTimes => self.actual_times.size(),
            AttachmentKind::ActualDurations => self.actual_durations.size(),
            AttachmentKind::CrossData => self.cross_data.size(),
            AttachmentKind::AutoData => self.auto_data.size(),
            AttachmentKind::ZeroLags => self.zero_lags.size(),
        }
    }

    /// Total number of spectral windows over all basebands.
    #[must_use]
    pub fn num_spectral_windows(&self) -> usize {
        self.basebands
            .iter()
            .map(|bb| bb.spectral_windows().len())
            .sum()
    }

    /// Returns the spectral window at a coordinate.
    ///
    /// # Errors
    /// Fails if either index is out of range.
    pub fn spectral_window(&self, coord: SpwCoord) -> Result<&SpectralWindow> {
        self.check_coord(coord)?;
        Ok(&self.basebands[coord.baseband].spectral_windows()[coord.spw])
    }

    fn check_coord(&self, coord: SpwCoord) -> Result<()> {
        let windows = match self.basebands.get(coord.baseband) {
            Some(bb) => bb.spectral_windows(),
            None => return Err(out_of_range("baseband", coord.baseband, self.basebands.len())),
        };
        if coord.spw >= windows.len() {
            return Err(out_of_range("spectral window", coord.spw, windows.len()));
        }
        Ok(())
    }

    /// Declares that the window at `(ibb1, ispw1)` has the window at
    /// `(ibb2, ispw2)` as its image.
    ///
    /// Any prior image of the first window and any prior back-reference of
    /// the second are removed first.
    ///
    /// # Errors
    /// Fails with [`ModelError::IndexOutOfRange`] if a coordinate does not exist.
    pub fn image_spw(&mut self, ibb1: usize, ispw1: usize, ibb2: usize, ispw2: usize) -> Result<()> {
        self.marry(SpwCoord::new(ibb1, ispw1), SpwCoord::new(ibb2, ispw2))
    }

    /// Declares that the window at `(ibb1, ispw1)` is the image of the window
    /// at `(ibb2, ispw2)`.
    ///
    /// # Errors
    /// Fails with [`ModelError::IndexOutOfRange`] if a coordinate does not exist.
    pub fn image_of_spw(
        &mut self,
        ibb1: usize,
        ispw1: usize,
        ibb2: usize,
        ispw2: usize,
    ) -> Result<()> {
        self.marry(SpwCoord::new(ibb2, ispw2), SpwCoord::new(ibb1, ispw1))
    }

    fn marry(&mut self, from: SpwCoord, to: SpwCoord) -> Result<()> {
        self.check_coord(from)?;
        self.check_coord(to)?;
        if self.images.get(&from) == Some(&to) {
            return Ok(());
        }
        if let Some(old_image) = self.images.remove(&from) {
            self.images_of.remove(&old_image);
        }
        if let Some(old_source) = self.images_of.remove(&to) {
            self.images.remove(&old_source);
        }
        self.images.insert(from, to);
        self.images_of.insert(to, from);
        Ok(())
    }

    /// Coordinate of the image of a window, if any.
    ///
    /// # Errors
    /// Fails if the coordinate does not exist.
    pub fn image_coord(&self, coord: SpwCoord) -> Result<Option<SpwCoord>> {
        self.check_coord(coord)?;
        Ok(self.images.get(&coord).copied())
    }

    /// Coordinate of the window whose image this window is, if any.
    ///
    /// # Errors
    /// Fails if the coordinate does not exist.
    pub fn image_of_coord(&self, coord: SpwCoord) -> Result<Option<SpwCoord>> {
        self.check_coord(coord)?;
        Ok(self.images_of.get(&coord).copied())
    }

    /// The image of the window at `(ibb, ispw)`, if any.
    ///
    /// # Errors
    /// Fails if the coordinate does not exist.
    pub fn spw_image(&self, ibb: usize, ispw: usize) -> Result<Option<&SpectralWindow>> {
        self.image_coord(SpwCoord::new(ibb, ispw))?
            .map(|c| self.spectral_window(c))
            .transpose()
    }

    /// The window whose image is the window at `(ibb, ispw)`, if any.
    ///
    /// # Errors
    /// Fails if the coordinate does not exist.
    pub fn spw_image_of(&self, ibb: usize, ispw: usize) -> Result<Option<&SpectralWindow>> {
        self.image_of_coord(SpwCoord::new(ibb, ispw))?
            .map(|c| self.spectral_window(c))
            .transpose()
    }

    /// Iterates over `(window, image)` edges in coordinate order.
    pub fn image_edges(&self) -> impl Iterator<Item = (SpwCoord, SpwCoord)> + '_ {
        self.images.iter().map(|(from, to)| (*from, *to))
    }

    /// Recomputes the `sw`/`id`/`image` tokens of every window from the image
    /// graph.
    ///
    /// `id` numbers windows from 1 in document order, `sw` from 1 within
    /// each baseband.
    pub fn update_spw_tokens(&mut self) {
        let mut tokens = BTreeMap::new();
        let mut n = 1;
        for (ibb, bb) in self.basebands.iter().enumerate() {
            for ispw in 0..bb.spectral_windows().len() {
                tokens.insert(SpwCoord::new(ibb, ispw), spw_token(n));
                n += 1;
            }
        }

        for (ibb, bb) in self.basebands.iter_mut().enumerate() {
            for (ispw, spw) in bb.spectral_windows_mut().iter_mut().enumerate() {
                let coord = SpwCoord::new(ibb, ispw);
                let id = tokens.get(&coord).map_or("", String::as_str);
                let image = self
                    .images
                    .get(&coord)
                    .and_then(|c| tokens.get(c))
                    .map_or("", String::as_str);
                spw.assign_tokens(&(ispw + 1).to_string(), id, image);
            }
        }
    }
}

fn out_of_range(coordinate: &'static str, index: usize, count: usize) -> ModelError {
    match count.checked_sub(1) {
        Some(bound) => ModelError::IndexOutOfRange {
            coordinate,
            index,
            bound,
        },
        None => ModelError::EmptyCoordinate { coordinate, index },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{BasebandName, NetSideband, StokesParameter};

    fn window() -> SpectralWindow {
        SpectralWindow::cross(vec![StokesParameter::Xx], 1.0, 64, 1, NetSideband::Lsb)
    }

    fn data_struct(layout: &[usize]) -> DataStruct {
        let basebands = layout
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let name = BASEBANDS[i];
                Baseband::new(name, (0..*n).map(|_| window()).collect())
            })
            .collect();
        DataStruct::new(basebands)
    }

    const BASEBANDS: [BasebandName; 4] = [
        BasebandName::Bb1,
        BasebandName::Bb2,
        BasebandName::Bb3,
        BasebandName::Bb4,
    ];

    #[test]
    fn test_image_spw_divorces_previous_image() {
        let mut ds = data_struct(&[3]);
        ds.image_spw(0, 0, 0, 1).expect("Failed to image spw");
        ds.image_spw(0, 0, 0, 2).expect("Failed to image spw");

        assert_eq!(
            ds.image_of_coord(SpwCoord::new(0, 1))
                .expect("Failed to look up"),
            None
        );
        assert_eq!(
            ds.image_coord(SpwCoord::new(0, 0)).expect("Failed to look up"),
            Some(SpwCoord::new(0, 2))
        );
        assert_eq!(
            ds.image_of_coord(SpwCoord::new(0, 2))
                .expect("Failed to look up"),
            Some(SpwCoord::new(0, 0))
        );
        assert_eq!(ds.image_edges().count(), 1);
    }

    #[test]
    fn test_image_spw_divorces_previous_source() {
        let mut ds = data_struct(&[3]);
        ds.image_spw(0, 0, 0, 2).expect("Failed to image spw");
        ds.image_spw(0, 1, 0, 2).expect("Failed to image spw");

        assert_eq!(
            ds.image_coord(SpwCoord::new(0, 0)).expect("Failed to look up"),
            None
        );
        assert_eq!(
            ds.image_of_coord(SpwCoord::new(0, 2))
                .expect("Failed to look up"),
            Some(SpwCoord::new(0, 1))
        );
    }

    #[test]
    fn test_image_of_spw_swaps_arguments() {
        let mut ds = data_struct(&[2, 2]);
        ds.image_of_spw(1, 1, 0, 0).expect("Failed to image spw");
        assert_eq!(
            ds.image_coord(SpwCoord::new(0, 0)).expect("Failed to look up"),
            Some(SpwCoord::new(1, 1))
        );
        assert!(ds.spw_image_of(1, 1).expect("Failed to look up").is_some());
        assert!(ds.spw_image(1, 0).expect("Failed to look up").is_none());
    }

    #[test]
    fn test_mutual_images_coexist() {
        let mut ds = data_struct(&[2]);
        ds.image_spw(0, 0, 0, 1).expect("Failed to image spw");
        ds.image_spw(0, 1, 0, 0).expect("Failed to image spw");
        assert_eq!(ds.image_edges().count(), 2);
    }

    #[test]
    fn test_image_spw_index_out_of_range() {
        let mut ds = data_struct(&[3]);
        let err = ds.image_spw(0, 5, 0, 0).expect_err("Index 5 should be rejected");
        assert_eq!(
            err,
            ModelError::IndexOutOfRange {
                coordinate: "spectral window",
                index: 5,
                bound: 2,
            }
        );

        let err = ds.image_spw(0, 0, 1, 0).expect_err("Baseband 1 should be rejected");
        assert_eq!(
            err,
            ModelError::IndexOutOfRange {
                coordinate: "baseband",
                index: 1,
                bound: 0,
            }
        );
        assert_eq!(ds.image_edges().count(), 0);
    }

    #[test]
    fn test_empty_coordinate() {
        let ds = DataStruct::default();
        assert!(matches!(
            ds.spw_image(0, 0),
            Err(ModelError::EmptyCoordinate { index: 0, .. })
        ));
    }

    #[test]
    fn test_update_spw_tokens() {
        let mut ds = data_struct(&[2, 2]);
        ds.image_spw(0, 0, 1, 1).expect("Failed to image spw");
        ds.update_spw_tokens();

        let ids: Vec<&str> = ds
            .basebands()
            .iter()
            .flat_map(|bb| bb.spectral_windows().iter().map(SpectralWindow::id))
            .collect();
        assert_eq!(ids, vec!["spw_1", "spw_2", "spw_3", "spw_4"]);
        let sws: Vec<&str> = ds
            .basebands()
            .iter()
            .flat_map(|bb| bb.spectral_windows().iter().map(SpectralWindow::sw))
            .collect();
        assert_eq!(sws, vec!["1", "2", "1", "2"]);
        assert_eq!(ds.basebands()[0].spectral_windows()[0].image(), "spw_4");
        assert_eq!(ds.basebands()[0].spectral_windows()[1].image(), "");

        ds.image_spw(0, 0, 0, 1).expect("Failed to image spw");
        ds.update_spw_tokens();
        assert_eq!(ds.basebands()[0].spectral_windows()[0].image(), "spw_2");
        assert_eq!(ds.basebands()[1].spectral_windows()[1].image(), "");
    }

    #[test]
    fn test_declared_size() {
        let ds = DataStruct::new(Vec::new())
            .with_flags(BinaryPart::new(12, Vec::new()))
            .with_auto_data(AutoDataBinaryPart::new(48, Vec::new(), false));
        assert_eq!(ds.declared_size(AttachmentKind::Flags), 12);
        assert_eq!(ds.declared_size(AttachmentKind::AutoData), 48);
        assert_eq!(ds.declared_size(AttachmentKind::CrossData), 0);
        assert_eq!(ds.num_spectral_windows(), 0);
    }
}
