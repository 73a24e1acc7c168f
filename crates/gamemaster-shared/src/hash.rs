use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// 32-bit rolling hash over UTF-16 code units (h * 31 + c), rendered as a
// signed decimal. Not a password hash; anyone with storage access can brute
// force it.
pub fn password_digest(password: &str) -> String {
    password
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
        .to_string()
}

pub fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
