//! 客户端 IP 解析
//!
//! 从代理请求头中尽力提取原始客户端 IP，用于匿名浏览去重。
//! 这里不做可信代理校验：结果只作为统计去重的键，不是安全控制。

use actix_web::http::header::HeaderMap;

/// 按优先级依次检查的请求头
pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const REAL_IP: &str = "x-real-ip";
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// 从 HeaderMap 提取客户端 IP
///
/// 1. `X-Forwarded-For`：取第一个逗号分隔项（原始客户端）
/// 2. `X-Real-IP`
/// 3. `CF-Connecting-IP`
///
/// 带端口的 IPv4（`a.b.c.d:port`）会去掉端口；IPv6 原样返回。
/// 无法读取的头（非可见 ASCII）和空值都视为不存在，继续检查下一个。
pub fn extract_client_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    let ip = header_str(headers, FORWARDED_FOR)
        .and_then(|s| s.split(',').next())
        .and_then(non_empty)
        .or_else(|| header_str(headers, REAL_IP).and_then(non_empty))
        .or_else(|| header_str(headers, CF_CONNECTING_IP).and_then(non_empty))?;

    Some(strip_ipv4_port(ip).to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|s| !s.is_empty())
}

/// 去掉 IPv4 地址后的 `:port`
///
/// 只匹配 `\d{1,3}(\.\d{1,3}){3}:\d+`，其余输入（包括 IPv6）原样返回。
pub fn strip_ipv4_port(ip: &str) -> &str {
    let Some((host, port)) = ip.split_once(':') else {
        return ip;
    };

    if is_dotted_quad(host) && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
        host
    } else {
        ip
    }
}

/// 四段 1-3 位数字，不校验每段范围
fn is_dotted_quad(host: &str) -> bool {
    let mut groups = 0;
    for group in host.split('.') {
        groups += 1;
        if groups > 4
            || group.is_empty()
            || group.len() > 3
            || !group.bytes().all(|b| b.is_ascii_digit())
        {
            return false;
        }
    }
    groups == 4
}
