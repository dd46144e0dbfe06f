//! Basebands and spectral windows.

use crate::enums::{BasebandName, CorrelationMode, NetSideband, StokesParameter};
use crate::error::{ModelError, Result};

const SPW_TOKEN_PREFIX: &str = "spw_";

/// Returns `true` if `token` matches `spw_<digits>`.
#[must_use]
pub fn is_spw_token(token: &str) -> bool {
    token
        .strip_prefix(SPW_TOKEN_PREFIX)
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Returns `true` if `token` is a baseband-local window number (`[0-9]+`).
#[must_use]
pub fn is_sw_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Builds the identity token for the spectral window at linear position `n`.
#[must_use]
pub fn spw_token(n: usize) -> String {
    format!("{SPW_TOKEN_PREFIX}{n}")
}

/// A contiguous frequency range within a baseband.
///
/// Which fields are meaningful depends on the correlation mode of the
/// owning document, so the accessors for mode-dependent fields take the
/// mode as an argument.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralWindow {
    cross_pol_products: Vec<StokesParameter>,
    sd_pol_products: Vec<StokesParameter>,
    scale_factor: f32,
    num_spectral_point: u32,
    num_bin: u32,
    sideband: NetSideband,
    sw: String,
    id: String,
    image: String,
}

impl SpectralWindow {
    /// Creates a spectral window for CROSS_ONLY data.
    #[must_use]
    pub fn cross(
        cross_pol_products: Vec<StokesParameter>,
        scale_factor: f32,
        num_spectral_point: u32,
        num_bin: u32,
        sideband: NetSideband,
    ) -> Self {
        Self {
            cross_pol_products,
            sd_pol_products: Vec::new(),
            scale_factor,
            num_spectral_point,
            num_bin,
            sideband,
            sw: String::new(),
            id: String::new(),
            image: String::new(),
        }
    }

    /// Creates a spectral window for AUTO_ONLY data (also total power and WVR).
    #[must_use]
    pub fn auto(
        sd_pol_products: Vec<StokesParameter>,
        num_spectral_point: u32,
        num_bin: u32,
        sideband: NetSideband,
    ) -> Self {
        Self {
            cross_pol_products: Vec::new(),
            sd_pol_products,
            scale_factor: 0.0,
            num_spectral_point,
            num_bin,
            sideband,
            sw: String::new(),
            id: String::new(),
            image: String::new(),
        }
    }

    /// Creates a spectral window for CROSS_AND_AUTO data.
    #[must_use]
    pub fn cross_and_auto(
        cross_pol_products: Vec<StokesParameter>,
        sd_pol_products: Vec<StokesParameter>,
        scale_factor: f32,
        num_spectral_point: u32,
        num_bin: u32,
        sideband: NetSideband,
    ) -> Self {
        Self {
            cross_pol_products,
            sd_pol_products,
            scale_factor,
            num_spectral_point,
            num_bin,
            sideband,
            sw: String::new(),
            id: String::new(),
            image: String::new(),
        }
    }

    /// Cross polarization products.
    ///
    /// # Errors
    /// Fails with [`ModelError::WrongCorrelationMode`] under AUTO_ONLY.
    pub fn cross_pol_products(&self, mode: CorrelationMode) -> Result<&[StokesParameter]> {
        if !mode.has_cross() {
            return Err(ModelError::WrongCorrelationMode {
                operation: "crossPolProducts",
                mode,
            });
        }
        Ok(&self.cross_pol_products)
    }

    /// Single dish polarization products.
    ///
    /// # Errors
    /// Fails with [`ModelError::WrongCorrelationMode`] under CROSS_ONLY.
    pub fn sd_pol_products(&self, mode: CorrelationMode) -> Result<&[StokesParameter]> {
        if !mode.has_auto() {
            return Err(ModelError::WrongCorrelationMode {
                operation: "sdPolProducts",
                mode,
            });
        }
        Ok(&self.sd_pol_products)
    }

    /// Scale factor applied to integer cross data.
    ///
    /// # Errors
    /// Fails with [`ModelError::WrongCorrelationMode`] under AUTO_ONLY.
    pub fn scale_factor(&self, mode: CorrelationMode) -> Result<f32> {
        if !mode.has_cross() {
            return Err(ModelError::WrongCorrelationMode {
                operation: "scaleFactor",
                mode,
            });
        }
        Ok(self.scale_factor)
    }

    /// Number of spectral points.
    #[must_use]
    pub const fn num_spectral_point(&self) -> u32 {
        self.num_spectral_point
    }

    /// Number of steps in a switching cycle (1 means no switching).
    #[must_use]
    pub const fn num_bin(&self) -> u32 {
        self.num_bin
    }

    /// Net sideband.
    #[must_use]
    pub const fn sideband(&self) -> NetSideband {
        self.sideband
    }

    /// Window number within its baseband (`sw` attribute), empty when not
    /// assigned.
    #[must_use]
    pub fn sw(&self) -> &str {
        &self.sw
    }

    /// Identity token, empty when not assigned.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Token of the image spectral window, empty when there is none.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Sets the identity token. An empty string clears it.
    ///
    /// # Errors
    /// Fails with [`ModelError::InvalidSpwToken`] if the token is not `spw_<n>`.
    pub fn set_id(&mut self, token: &str) -> Result<()> {
        self.id = checked_token(token)?;
        Ok(())
    }

    /// Sets the window number within the baseband. An empty string clears it.
    ///
    /// # Errors
    /// Fails with [`ModelError::InvalidSpwToken`] if the token is not a
    /// decimal number.
    pub fn set_sw(&mut self, token: &str) -> Result<()> {
        if !token.is_empty() && !is_sw_token(token) {
            return Err(ModelError::InvalidSpwToken {
                token: token.to_string(),
            });
        }
        token.clone_into(&mut self.sw);
        Ok(())
    }

    /// Sets the image token. An empty string clears it.
    ///
    /// # Errors
    /// Fails with [`ModelError::InvalidSpwToken`] if the token is not `spw_<n>`.
    pub fn set_image(&mut self, token: &str) -> Result<()> {
        self.image = checked_token(token)?;
        Ok(())
    }

    pub(crate) fn assign_tokens(&mut self, sw: &str, id: &str, image: &str) {
        sw.clone_into(&mut self.sw);
        id.clone_into(&mut self.id);
        image.clone_into(&mut self.image);
    }
}

fn checked_token(token: &str) -> Result<String> {
    if token.is_empty() || is_spw_token(token) {
        Ok(token.to_string())
    } else {
        Err(ModelError::InvalidSpwToken {
            token: token.to_string(),
        })
    }
}

/// A frequency sub-band of the receiver and its spectral windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseband {
    name: BasebandName,
    spectral_windows: Vec<SpectralWindow>,
}

impl Baseband {
    /// Creates a new baseband.
    #[must_use]
    pub fn new(name: BasebandName, spectral_windows: Vec<SpectralWindow>) -> Self {
        Self {
            name,
            spectral_windows,
        }
    }

    /// Baseband name.
    #[must_use]
    pub const fn name(&self) -> BasebandName {
        self.name
    }

    /// Spectral windows in document order.
    #[must_use]
    pub fn spectral_windows(&self) -> &[SpectralWindow] {
        &self.spectral_windows
    }

    pub(crate) fn spectral_windows_mut(&mut self) -> &mut [SpectralWindow] {
        &mut self.spectral_windows
    }
}
