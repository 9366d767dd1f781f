//! Live reload: WebSocket listener and the client-side snippet injected
//! into served HTML.

pub mod server;

/// JSON payload telling clients to reload.
pub fn reload_message(reason: &str) -> String {
    serde_json::json!({ "type": "reload", "reason": reason }).to_string()
}

/// Client script injected before `</body>` of served HTML pages.
///
/// `{{WS_PORT}}` is substituted with the actual WebSocket port at serve
/// time (the listener may have moved ports when the default was taken).
pub const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var retry = 1000;
  function connect() {
    var ws = new WebSocket("ws://" + location.hostname + ":{{WS_PORT}}");
    ws.onmessage = function (ev) {
      try {
        var msg = JSON.parse(ev.data);
        if (msg.type === "reload") location.reload();
      } catch (_) {}
    };
    ws.onclose = function () { setTimeout(connect, retry); };
  }
  connect();
})();
</script>"#;

/// Substitute the port into the client script.
pub fn client_script(ws_port: u16) -> String {
    RELOAD_SCRIPT.replace("{{WS_PORT}}", &ws_port.to_string())
}
