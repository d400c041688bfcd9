use tokio::sync::watch;

/// Page visibility and network reachability as seen by the supervisor.
///
/// The host feeds changes in through the matching [`PlatformController`].
/// Targets without either concept use [`Platform::always_available`], where
/// both waits resolve immediately.
#[derive(Clone)]
pub struct Platform {
    visible: watch::Receiver<bool>,
    online: watch::Receiver<bool>,
}

pub struct PlatformController {
    visible: watch::Sender<bool>,
    online: watch::Sender<bool>,
}

impl Platform {
    /// A visible, online platform plus the controller that changes it.
    pub fn new() -> (PlatformController, Platform) {
        let (visible_tx, visible_rx) = watch::channel(true);
        let (online_tx, online_rx) = watch::channel(true);
        (
            PlatformController {
                visible: visible_tx,
                online: online_tx,
            },
            Platform {
                visible: visible_rx,
                online: online_rx,
            },
        )
    }

    pub fn always_available() -> Platform {
        let (_controller, platform) = Self::new();
        platform
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Resolves once the page is visible. A dropped controller counts as
    /// visible, since nothing could ever change it back.
    pub async fn visible(&self) {
        let mut rx = self.visible.clone();
        let _ = rx.wait_for(|visible| *visible).await;
    }

    /// Resolves once the device is online. Same closed-controller rule as
    /// [`visible`](Self::visible).
    pub async fn online(&self) {
        let mut rx = self.online.clone();
        let _ = rx.wait_for(|online| *online).await;
    }

    /// Resolves once the page is hidden. With the controller gone the page
    /// can never be hidden, so this never resolves.
    pub async fn hidden(&self) {
        let mut rx = self.visible.clone();
        if rx.wait_for(|visible| !*visible).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Resolves once the device goes offline. Same closed-controller rule as
    /// [`hidden`](Self::hidden).
    pub async fn offline(&self) {
        let mut rx = self.online.clone();
        if rx.wait_for(|online| !*online).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl PlatformController {
    pub fn set_visible(&self, visible: bool) {
        self.visible.send_replace(visible);
    }

    pub fn set_online(&self, online: bool) {
        self.online.send_replace(online);
    }
}
