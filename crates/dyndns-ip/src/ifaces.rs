//! Local interface address enumeration
//!
//! IPv6 discovery never leaves the machine: global addresses are assigned
//! directly to interfaces, so `getifaddrs` is sufficient and works offline.

/// All IPv6 addresses assigned to local interfaces, as text
///
/// Link-local addresses carry their scope id as a `%N` suffix, which the
/// global-address filter later uses to reject them. Errors degrade to an
/// empty list; discovery failure is not fatal to a cycle.
#[cfg(unix)]
pub fn interface_addresses() -> Vec<String> {
    let mut addresses = Vec::new();

    unsafe {
        let mut ifap: *mut libc::ifaddrs = std::ptr::null_mut();
        if libc::getifaddrs(&mut ifap) != 0 {
            return addresses;
        }

        let mut cursor = ifap;
        while !cursor.is_null() {
            let entry = &*cursor;
            if !entry.ifa_addr.is_null()
                && i32::from((*entry.ifa_addr).sa_family) == libc::AF_INET6
            {
                let sin6 = &*(entry.ifa_addr as *const libc::sockaddr_in6);
                let addr = std::net::Ipv6Addr::from(sin6.sin6_addr.s6_addr);

                let mut text = addr.to_string();
                if sin6.sin6_scope_id != 0 {
                    text.push('%');
                    text.push_str(&sin6.sin6_scope_id.to_string());
                }
                addresses.push(text);
            }
            cursor = entry.ifa_next;
        }

        libc::freeifaddrs(ifap);
    }

    addresses
}

#[cfg(not(unix))]
pub fn interface_addresses() -> Vec<String> {
    Vec::new()
}
