//! IPアドレス正規化ユーティリティ
//!
//! ディレクトリAPIから得たIPとポートを`http://{host}/info`で使える
//! ホスト名に整形する

use std::net::IpAddr;

/// IPアドレスを正規化する
///
/// IPv4-mapped IPv6（::ffff:x.x.x.x）をIPv4に変換。
/// それ以外はそのまま返す。
pub fn normalize_ip(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                IpAddr::V4(v4)
            } else {
                IpAddr::V6(v6)
            }
        }
        v4 => v4,
    }
}

/// `host:port`形式の文字列を組み立てる
///
/// IPv6は角括弧で囲む。IPとして解釈できないホスト名はそのまま使う。
pub fn format_host_port(host: &str, port: &str) -> String {
    match host.parse::<IpAddr>() {
        Ok(addr) => match normalize_ip(addr) {
            IpAddr::V4(v4) => format!("{v4}:{port}"),
            IpAddr::V6(v6) => format!("[{v6}]:{port}"),
        },
        Err(_) => format!("{host}:{port}"),
    }
}
