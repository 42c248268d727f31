//! Snapshot renderings
//!
//! Pure projection from a [`StatusSnapshot`] to the three textual
//! representations served downstream. Total over its input domain: the
//! "no snapshot yet" and "player not running" cases render as the empty
//! string, and nothing here can fail.

use crate::client::StatusSnapshot;

/// Display-ready projection of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingView {
    pub artist: String,
    pub track: String,
    pub album: String,
    pub url: String,
    pub duration: String,
    pub position: String,
}

impl NowPlayingView {
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        Self {
            artist: snapshot.track.artist_resource.name.clone(),
            track: snapshot.track.track_resource.name.clone(),
            album: snapshot.track.album_resource.name.clone(),
            url: snapshot.track.track_resource.location.og.clone(),
            duration: humanize(u64::from(snapshot.track.length)),
            // Truncated toward zero, not rounded.
            position: humanize(snapshot.playing_position as u64),
        }
    }

    /// The bracketed one-line summary shared by every rendering.
    fn summary(&self) -> String {
        format!(
            "[{}/{}] {} - {} ({})",
            self.position, self.duration, self.artist, self.track, self.album
        )
    }

    /// Same summary with the artist/track pair wrapped in an anchor.
    fn linked_summary(&self) -> String {
        format!(
            r#"[{}/{}] <a href="{}">{} - {}</a> ({})"#,
            self.position, self.duration, self.url, self.artist, self.track, self.album
        )
    }
}

/// `"MM:SS"` with truncating division; minutes are not capped or wrapped
/// at 60 (3661 seconds renders as `"61:01"`).
pub fn humanize(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn playing_view(snapshot: Option<&StatusSnapshot>) -> Option<NowPlayingView> {
    snapshot
        .filter(|s| s.running)
        .map(NowPlayingView::from_snapshot)
}

/// `"[POS/DUR] ARTIST - TRACK (ALBUM)\nURL\n"`, or `""`.
pub fn render_text(snapshot: Option<&StatusSnapshot>) -> String {
    match playing_view(snapshot) {
        Some(view) => format!("{}\n{}\n", view.summary(), view.url),
        None => String::new(),
    }
}

/// Single-line fragment meant to replace a DOM node's content, or `""`.
pub fn render_fragment(snapshot: Option<&StatusSnapshot>) -> String {
    match playing_view(snapshot) {
        Some(view) => view.linked_summary(),
        None => String::new(),
    }
}

/// Full HTML document, or `""`. The title mirrors the plain-text summary;
/// the body carries the current fragment and the script that live-replaces
/// it from the push endpoint.
pub fn render_html(snapshot: Option<&StatusSnapshot>) -> String {
    let Some(view) = playing_view(snapshot) else {
        return String::new();
    };
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
  <div id="status">{fragment}</div>

  <script>
  const socket = new WebSocket("ws://" + window.location.host + "/ws");
  socket.onmessage = (event) => {{
    document.querySelector("title").innerHTML = event.data;
    document.querySelector("#status").innerHTML = event.data;
  }};
  </script>
</body>
</html>
"##,
        title = view.summary(),
        fragment = view.linked_summary(),
    )
}
