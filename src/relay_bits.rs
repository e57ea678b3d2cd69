use crate::relay_types::RelayState;
use crate::relay_types::MAX_RELAYS;

// Bit k of the GPIO register drives relay k + 1; a set bit means the relay is on.

pub fn decode(register: u8, count: usize) -> Vec<RelayState> {
    (0..count.min(MAX_RELAYS))
        .map(|k| RelayState::from((register >> k) & 1 == 1))
        .collect()
}

pub fn set_bit(register: u8, index: usize, state: RelayState) -> u8 {
    if index >= MAX_RELAYS {
        return register;
    }
    match state {
        RelayState::On => register | (1 << index),
        RelayState::Off => register & !(1 << index),
    }
}

pub fn all_on(register: u8, count: usize) -> u8 {
    register | low_mask(count)
}

pub fn all_off(register: u8, count: usize) -> u8 {
    register & !low_mask(count)
}

fn low_mask(count: usize) -> u8 {
    match count {
        0 => 0,
        n if n >= MAX_RELAYS => 0xFF,
        n => (1u8 << n) - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RelayState::*;

    fn encode(states: &[RelayState]) -> u8 {
        states
            .iter()
            .enumerate()
            .fold(0u8, |register, (index, state)| set_bit(register, index, *state))
    }

    #[test]
    fn test_decode_low_bits() {
        assert_eq!(decode(0b0000_0101, 4), vec![On, Off, On, Off]);
        assert_eq!(decode(0xFF, 0), Vec::<RelayState>::new());
        assert_eq!(decode(0x80, 8)[7], On);
    }

    #[test]
    fn test_decode_then_encode_keeps_low_bits() {
        for register in 0..=255u8 {
            for count in 0..=8usize {
                let rebuilt = encode(&decode(register, count));
                assert_eq!(rebuilt, register & low_mask(count), "r={register:#04x} n={count}");
            }
        }
    }

    #[test]
    fn test_set_bit_on_then_off() {
        let register = 0b1010_0000;
        let on = set_bit(register, 2, On);
        assert_eq!(on, 0b1010_0100);
        assert_eq!(set_bit(on, 2, Off), register);
        assert_eq!(set_bit(on, 2, On), on);
    }

    #[test]
    fn test_set_bit_ignores_index_past_register() {
        assert_eq!(set_bit(0x12, 8, On), 0x12);
    }

    #[test]
    fn test_all_on_off_keep_high_bits() {
        assert_eq!(all_on(0b1000_0000, 4), 0b1000_1111);
        assert_eq!(all_off(0b1111_1111, 4), 0b1111_0000);
        assert_eq!(all_on(0x00, 8), 0xFF);
        assert_eq!(all_off(0xFF, 8), 0x00);
    }
}
