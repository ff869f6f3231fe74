//! Per-request entry point.
//!
//! An [`AssetContext`] is created for each page render. It borrows the
//! long-lived [`ManifestProvider`] and [`DevServerProbe`] and owns the
//! render's nonce suppression registry, so nothing leaks between requests.
//!
//! ```ignore
//! let provider = ManifestProvider::new(&config);
//! let probe = DevServerProbe::new(&config);
//!
//! // per request
//! let mut urls = SimpleUrlGenerator::new("/", "public");
//! let mut page = RequirementsBuffer::new();
//! let mut assets = AssetContext::new(&provider, &probe, &mut urls, &mut page);
//! assets.javascript("src/main.ts", &ScriptOptions::default())?;
//! ```

use crate::config::Config;
use crate::dev_server::DevServerProbe;
use crate::emitter::TagEmitter;
use crate::error::Result;
use crate::graph::{PreloadSet, ResolvePass};
use crate::manifest::ManifestProvider;
use crate::nonce::NonceSuppressionRegistry;
use crate::options::{ScriptOptions, StyleOptions};
use crate::requirements::{Requirements, ScriptAttributes, StyleAttributes};
use crate::urls::ResourceUrlGenerator;

/// Dev server path of the HMR client.
pub const VITE_CLIENT: &str = "@vite/client";
/// Dev server path of the React fast-refresh runtime.
pub const REACT_REFRESH: &str = "@react-refresh";

/// Asset requirements for one page render.
pub struct AssetContext<'a> {
    provider: &'a ManifestProvider,
    dev_server: &'a DevServerProbe,
    urls: &'a mut dyn ResourceUrlGenerator,
    requirements: &'a mut dyn Requirements,
    disabled_nonce_paths: Vec<String>,
    nonce: NonceSuppressionRegistry,
    client_injected: bool,
    react_refresh_injected: bool,
}

impl<'a> AssetContext<'a> {
    pub fn new(
        provider: &'a ManifestProvider,
        dev_server: &'a DevServerProbe,
        urls: &'a mut dyn ResourceUrlGenerator,
        requirements: &'a mut dyn Requirements,
    ) -> Self {
        Self {
            provider,
            dev_server,
            urls,
            requirements,
            disabled_nonce_paths: Vec::new(),
            nonce: NonceSuppressionRegistry::new(),
            client_injected: false,
            react_refresh_injected: false,
        }
    }

    /// Take the static `disabled_nonce_paths` list from config.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.disabled_nonce_paths
            .clone_from(&config.disabled_nonce_paths);
        self
    }

    /// Require a JavaScript entry and everything it imports.
    ///
    /// With the dev server up this is a single module script pointing at it.
    pub fn javascript(&mut self, file: &str, options: &ScriptOptions) -> Result<()> {
        if self.is_dev_server_running() {
            if let Some(url) = self.dev_server.resource_url(file) {
                self.requirements
                    .add_script(&url, &ScriptAttributes::from_options(options));
            }
            return Ok(());
        }

        let preloads = self.resolve(|pass| pass.add_js(file, options))?;
        if options.preload {
            self.insert_preload_tags(&preloads)?;
        }
        Ok(())
    }

    /// Require a stylesheet entry.
    pub fn css(&mut self, file: &str, media: Option<&str>, options: &StyleOptions) -> Result<()> {
        if self.is_dev_server_running() {
            if let Some(url) = self.dev_server.resource_url(file) {
                self.requirements
                    .add_stylesheet(&url, media, &StyleAttributes::from(options));
            }
            return Ok(());
        }

        let preloads = self.resolve(|pass| pass.add_css(file, media, options))?;
        if options.preload {
            self.insert_preload_tags(&preloads)?;
        }
        Ok(())
    }

    /// Insert a preload hint for a manifest file. Does nothing against the
    /// dev server, which serves sources unbundled.
    pub fn preload(&mut self, file: &str, as_: Option<&str>, mime: Option<&str>) -> Result<()> {
        if self.is_dev_server_running() {
            return Ok(());
        }

        let preloads = self.resolve(|pass| {
            pass.preload_file(file, as_, mime);
            Ok(())
        })?;
        self.insert_preload_tags(&preloads)
    }

    /// Whether the dev server is up. The first positive answer also adds the
    /// HMR client script to this page.
    pub fn is_dev_server_running(&mut self) -> bool {
        let running = self.dev_server.is_running();
        if running && !self.client_injected {
            self.client_injected = true;
            if let Some(url) = self.dev_server.resource_url(VITE_CLIENT) {
                self.requirements.add_script(&url, &ScriptAttributes::module());
            }
        }
        running
    }

    /// URL of `file` on the dev server, if one is configured.
    pub fn dev_server_resource_url(&mut self, file: &str) -> Option<String> {
        self.is_dev_server_running();
        self.dev_server.resource_url(file)
    }

    /// Initialize the dev server now rather than on the first asset, so the
    /// template controls where the client script lands. With `react`, also
    /// insert the fast-refresh preamble.
    pub fn configure_dev_server(&mut self, react: bool) {
        self.is_dev_server_running();
        if react {
            self.insert_react_refresh();
        }
    }

    /// Insert the React fast-refresh preamble once per page. No-op without a
    /// running dev server.
    pub fn insert_react_refresh(&mut self) {
        if !self.is_dev_server_running() || self.react_refresh_injected {
            return;
        }
        let Some(runtime_url) = self.dev_server.resource_url(REACT_REFRESH) else {
            return;
        };

        let preamble = react_refresh_preamble(&runtime_url);
        self.requirements
            .add_custom_script(&preamble, &ScriptAttributes::module());
        self.react_refresh_injected = true;
    }

    #[must_use]
    pub fn is_suppressed_file(&self, file: &str) -> bool {
        self.nonce.is_disabled_for_file(file)
    }

    #[must_use]
    pub fn is_suppressed_path(&self, path: &str) -> bool {
        self.nonce.is_disabled_for_path(path)
    }

    pub fn add_suppression(&mut self, file: impl Into<String>, path: impl Into<String>) {
        self.nonce.add(file, path);
    }

    pub fn remove_suppression(&mut self, file: &str) -> Option<String> {
        self.nonce.remove(file)
    }

    #[must_use]
    pub fn suppression(&self) -> &NonceSuppressionRegistry {
        &self.nonce
    }

    /// Built path of a manifest resource.
    #[must_use]
    pub fn resource_path(&self, resource: &str) -> Option<String> {
        self.provider.resolve_path(resource)
    }

    /// URL of a manifest resource, honouring this page's nonce suppression.
    pub fn resource_url(&mut self, resource: &str) -> Result<Option<String>> {
        let Some(path) = self.provider.resolve_path(resource) else {
            return Ok(None);
        };
        let mut emitter = TagEmitter::new(
            &mut *self.urls,
            &mut *self.requirements,
            &self.disabled_nonce_paths,
        );
        emitter.url_for(&self.nonce, &path).map(Some)
    }

    fn resolve<F>(&mut self, f: F) -> Result<PreloadSet>
    where
        F: FnOnce(&mut ResolvePass<'_, '_>) -> Result<()>,
    {
        let mut emitter = TagEmitter::new(
            &mut *self.urls,
            &mut *self.requirements,
            &self.disabled_nonce_paths,
        );
        let mut pass = ResolvePass::new(self.provider, &mut self.nonce, &mut emitter);
        f(&mut pass)?;
        Ok(pass.into_preloads())
    }

    fn insert_preload_tags(&mut self, preloads: &PreloadSet) -> Result<()> {
        let mut emitter = TagEmitter::new(
            &mut *self.urls,
            &mut *self.requirements,
            &self.disabled_nonce_paths,
        );
        emitter.insert_preload_tags(&self.nonce, preloads)
    }
}

fn react_refresh_preamble(runtime_url: &str) -> String {
    format!(
        "import RefreshRuntime from '{runtime_url}'\n\
         RefreshRuntime.injectIntoGlobalHook(window)\n\
         window.$RefreshReg$ = () => {{}}\n\
         window.$RefreshSig$ = () => (type) => type\n\
         window.__vite_plugin_react_preamble_installed__ = true\n"
    )
}
