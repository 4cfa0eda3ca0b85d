//! Explorer windows and shell links through COM

use super::is_windows_fs_path;
use crate::recent::ShortcutResolver;
use crate::window::{WindowEnumerator, WindowId};
use crate::WatchError;
use footprints_core::file_url_to_path;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use windows::core::{Interface, HSTRING, VARIANT};
use windows::Win32::Foundation::MAX_PATH;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, IPersistFile, CLSCTX_ALL,
    CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, STGM_READ,
};
use windows::Win32::UI::Shell::{
    IShellFolderViewDual, IShellLinkW, IShellWindows, IWebBrowser2, ShellLink, ShellWindows,
};

/// `%APPDATA%\Microsoft\Windows\Recent`
pub fn recent_dir() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    Some(
        PathBuf::from(appdata)
            .join("Microsoft")
            .join("Windows")
            .join("Recent"),
    )
}

/// COM initialized on the current thread until dropped
///
/// Created lazily on first use so it lands on the watcher thread, not on
/// the thread that built the watcher.
struct ComApartment;

impl ComApartment {
    fn enter() -> Result<Self, WatchError> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
            .ok()
            .map_err(|e| WatchError::Enumeration(format!("COM initialization failed: {e}")))?;
        Ok(Self)
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Enumerates open Explorer windows through `IShellWindows`
///
/// Windows are keyed by their HWND. Shell windows hosted by other
/// processes, and virtual folders without a file-system path, are left out.
#[derive(Default)]
pub struct ExplorerWindows {
    com: Option<ComApartment>,
}

impl WindowEnumerator for ExplorerWindows {
    fn enumerate(&mut self) -> Result<BTreeMap<WindowId, String>, WatchError> {
        if self.com.is_none() {
            self.com = Some(ComApartment::enter()?);
        }

        let shell: IShellWindows = unsafe { CoCreateInstance(&ShellWindows, None, CLSCTX_ALL) }
            .map_err(|e| WatchError::Enumeration(format!("ShellWindows unavailable: {e}")))?;
        let count = unsafe { shell.Count() }
            .map_err(|e| WatchError::Enumeration(format!("ShellWindows count failed: {e}")))?;

        let mut windows = BTreeMap::new();
        for index in 0..count {
            match explorer_window(&shell, index) {
                Ok(Some((id, path))) => {
                    windows.insert(id, path);
                }
                Ok(None) => {}
                Err(e) => debug!("Skipping shell window {}: {}", index, e),
            }
        }
        Ok(windows)
    }
}

fn explorer_window(
    shell: &IShellWindows,
    index: i32,
) -> windows::core::Result<Option<(WindowId, String)>> {
    let dispatch = unsafe { shell.Item(&VARIANT::from(index)) }?;
    let browser: IWebBrowser2 = dispatch.cast()?;

    let host = unsafe { browser.FullName() }?.to_string();
    if !host.to_ascii_lowercase().ends_with("explorer.exe") {
        return Ok(None);
    }

    let path = match folder_path(&browser) {
        Ok(path) => Some(path),
        Err(e) => {
            debug!("Folder path unavailable, falling back to LocationURL: {}", e);
            let url = unsafe { browser.LocationURL() }?.to_string();
            file_url_to_path(&url)
        }
    };
    let Some(path) = path.filter(|p| is_windows_fs_path(p)) else {
        return Ok(None);
    };

    let hwnd = unsafe { browser.HWND() }?;
    Ok(Some((hwnd.0 as WindowId, path)))
}

/// `Document.Folder.Self.Path`, which keeps `#` and `?` that a URL would split off
fn folder_path(browser: &IWebBrowser2) -> windows::core::Result<String> {
    unsafe {
        let view: IShellFolderViewDual = browser.Document()?.cast()?;
        Ok(view.Folder()?.Self_()?.Path()?.to_string())
    }
}

/// Resolves `.lnk` files through `IShellLinkW`
#[derive(Default)]
pub struct ShellLinkResolver {
    com: Option<ComApartment>,
}

impl ShortcutResolver for ShellLinkResolver {
    fn resolve(&mut self, shortcut: &Path) -> Result<PathBuf, WatchError> {
        if self.com.is_none() {
            self.com = Some(ComApartment::enter()?);
        }

        let failed = |e: windows::core::Error| WatchError::Resolve {
            path: shortcut.to_path_buf(),
            reason: e.to_string(),
        };

        let mut buf = [0u16; MAX_PATH as usize];
        unsafe {
            let link: IShellLinkW =
                CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER).map_err(failed)?;
            let file: IPersistFile = link.cast().map_err(failed)?;
            file.Load(&HSTRING::from(shortcut), STGM_READ).map_err(failed)?;
            link.GetPath(&mut buf, std::ptr::null_mut(), 0).map_err(failed)?;
        }

        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        if len == 0 {
            return Err(WatchError::Resolve {
                path: shortcut.to_path_buf(),
                reason: "shortcut has no file-system target".to_string(),
            });
        }
        Ok(PathBuf::from(String::from_utf16_lossy(&buf[..len])))
    }
}
